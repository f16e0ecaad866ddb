use schemars::schema_for;
use tableflow_core::Template;

fn main() {
    let schema = schema_for!(Template);
    let json = serde_json::to_string_pretty(&schema).expect("serialize json schema");
    println!("{json}");
}
