extern crate wasm_bindgen;

use wasm_bindgen::prelude::*;

pub mod grammar;
pub use grammar::{
    FirstFollow, FirstSet, Grammar, GrammarError, GrammarNotLl1, GrammarWarning, Ll1Table,
    Production, ProductionId, Rejection, Symbol,
};

fn error_to_json(e: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

#[wasm_bindgen]
pub fn first_follow_to_json(grammar: &str) -> String {
    match crate::Grammar::parse(grammar) {
        Ok(g) => {
            let ff = FirstFollow::compute(&g);
            ff.to_non_terminal_output_vec()
                .to_json()
                .unwrap_or_else(error_to_json)
        }
        Err(e) => error_to_json(e),
    }
}

#[wasm_bindgen]
pub fn ll1_table_to_json(grammar: &str) -> String {
    match crate::Grammar::parse(grammar) {
        Ok(g) => {
            let ff = FirstFollow::compute(&g);
            let table = Ll1Table::build(&ff);
            serde_json::to_string(&table.to_output()).unwrap_or_else(error_to_json)
        }
        Err(e) => error_to_json(e),
    }
}

#[wasm_bindgen]
pub fn validate_to_json(grammar: &str, input: &str) -> String {
    match crate::Grammar::parse(grammar) {
        Ok(g) => {
            let ff = FirstFollow::compute(&g);
            let table = Ll1Table::build(&ff);
            serde_json::to_string(&table.to_validation_output(input, true))
                .unwrap_or_else(error_to_json)
        }
        Err(e) => error_to_json(e),
    }
}


#[cfg(test)]
mod json_tests {
    #[test]
    fn errors_are_reported_as_json() {
        assert_eq!(
            crate::first_follow_to_json("S -> a -> b"),
            r#"{"error":"Line 1: too many \"->\""}"#
        );
    }

    #[test]
    fn table_json_carries_verdict() {
        let json: serde_json::Value =
            serde_json::from_str(&crate::ll1_table_to_json("S -> a S | ε")).unwrap();
        assert_eq!(json["ll1"], serde_json::Value::Bool(true));
        assert_eq!(json["terminals"], serde_json::json!(["a", "$"]));
    }

    #[test]
    fn validation_json() {
        let json: serde_json::Value =
            serde_json::from_str(&crate::validate_to_json("S -> a S | ε", "a a")).unwrap();
        assert_eq!(json["accepted"], serde_json::Value::Bool(true));
        assert_eq!(json["reason"], serde_json::Value::Null);
    }
}
