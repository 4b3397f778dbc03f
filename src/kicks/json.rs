//! JSON parsing with serde path reporting.

/// Deserialize `body`, reporting the JSON path and position of the first failure.
pub fn parse_json_with_path<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, String> {
    let jd = &mut serde_json::Deserializer::from_slice(body);
    serde_path_to_error::deserialize(jd).map_err(|err| {
        let path = err.path().to_string();
        let inner = err.into_inner();
        if path.is_empty() || path == "." {
            inner.to_string()
        } else {
            format!("at path '{path}': {inner}")
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn reports_nested_path_of_type_mismatch() {
        #[derive(Debug, Deserialize)]
        struct Envelope {
            #[allow(dead_code)]
            data: Vec<Item>,
        }

        #[derive(Debug, Deserialize)]
        struct Item {
            #[allow(dead_code)]
            rank: u32,
        }

        let err = parse_json_with_path::<Envelope>(br#"{"data": [{"rank": 1}, {"rank": "x"}]}"#)
            .unwrap_err();
        assert!(err.starts_with("at path 'data[1].rank'"), "{err}");
    }

    #[test]
    fn syntax_errors_keep_position() {
        let err = parse_json_with_path::<serde_json::Value>(b"[1, 2,").unwrap_err();
        assert!(err.contains("line 1"), "{err}");
    }
}
