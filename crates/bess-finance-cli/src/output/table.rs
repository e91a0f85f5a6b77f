use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// A `rows` array in the result is printed as the year table; a sensitivity
/// `matrix` as a grid; any remaining scalars as a Field/Value table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result(result);
                print_envelope_notes(map);
            } else {
                print_flat_object(map);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Value) {
    let Value::Object(res_map) = result else {
        println!("{}", format_value(result));
        return;
    };

    if let Some(Value::Array(rows)) = res_map.get("rows") {
        print_array_table(rows);
    }
    if let Some(Value::Array(matrix)) = res_map.get("matrix") {
        print_matrix(res_map, matrix);
    }

    let mut scalars = Map::new();
    for (key, val) in res_map {
        match (key.as_str(), val) {
            ("rows" | "matrix", _) => {}
            (_, Value::Object(nested)) => {
                println!("\n{}:", key);
                print_nested(nested);
            }
            _ => {
                scalars.insert(key.clone(), val.clone());
            }
        }
    }
    if !scalars.is_empty() {
        print_flat_object(&scalars);
    }
}

/// Nested objects holding their own `rows` (the debt schedule) print as tables.
fn print_nested(map: &Map<String, Value>) {
    if let Some(Value::Array(rows)) = map.get("rows") {
        print_array_table(rows);
        let rest: Map<String, Value> = map
            .iter()
            .filter(|(k, _)| k.as_str() != "rows")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        print_flat_object(&rest);
    } else {
        print_flat_object(map);
    }
}

fn print_matrix(res_map: &Map<String, Value>, matrix: &[Value]) {
    let v1 = res_map
        .get("variable_1_values")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let v2 = res_map
        .get("variable_2_values")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let corner = res_map
        .get("variable_1")
        .map(format_value)
        .unwrap_or_default();

    let mut builder = Builder::default();
    let mut header = vec![corner];
    if v2.is_empty() {
        header.push(res_map.get("output_metric").map(format_value).unwrap_or_default());
    } else {
        header.extend(v2.iter().map(format_value));
    }
    builder.push_record(header);

    for (i, row) in matrix.iter().enumerate() {
        let mut record = vec![v1.get(i).map(format_value).unwrap_or_default()];
        if let Value::Array(cells) = row {
            record.extend(cells.iter().map(format_value));
        }
        builder.push_record(record);
    }
    println!("{}", Table::from(builder));
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
