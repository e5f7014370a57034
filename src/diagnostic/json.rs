use super::{Diagnostic, SourceMap};

pub fn to_value(d: &Diagnostic) -> serde_json::Value {
    let mut obj = serde_json::json!({
        "message": d.message,
        "notes": d.notes,
    });

    if let Some(code) = d.code {
        obj["code"] = serde_json::Value::String(code.to_string());
    }

    if let Some(label) = &d.label {
        let mut l = serde_json::json!({
            "start": label.span.start,
            "end": label.span.end,
            "message": label.message,
        });
        if let Some(source) = &d.source {
            let (line, col) = SourceMap::new(source).lookup(label.span.start);
            l["line"] = serde_json::Value::from(line);
            l["col"] = serde_json::Value::from(col);
        }
        obj["label"] = l;
    }

    if let Some(s) = &d.suggestion {
        obj["suggestion"] = serde_json::Value::String(s.clone());
    }

    obj
}

pub fn render(d: &Diagnostic) -> String {
    to_value(d).to_string()
}
