//! WASM bindings for tablemove
//!
//! JavaScript-accessible move checks and moves for drag-and-drop table
//! editors. Tables are passed in notation; every call parses its own copy,
//! so results never go stale between calls.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "wasm")]
use crate::{Document, MoveOptions, MoveValidation, MoveValidator, Path};

/// Move options (exposed to WASM)
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WasmMoveOptions {
    /// Path of the table, or of any node inside it
    #[serde(default)]
    pub at: Option<Vec<usize>>,
}

#[cfg(feature = "wasm")]
impl From<WasmMoveOptions> for MoveOptions {
    fn from(opts: WasmMoveOptions) -> Self {
        MoveOptions {
            at: opts.at.map(Path::new),
        }
    }
}

/// Result of a move
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize)]
pub struct MoveResult {
    /// The table after the move; the input unchanged when the move failed
    pub output: String,
    pub success: bool,
    /// Why the move was rejected
    pub validation: MoveValidation,
}

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[cfg(feature = "wasm")]
fn parse(input: &str, options: JsValue) -> Result<(Document, MoveOptions), JsError> {
    let doc = Document::from_notation(input).map_err(|e| JsError::new(&e.to_string()))?;
    let opts: WasmMoveOptions = if options.is_undefined() || options.is_null() {
        WasmMoveOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsError::new(&e.to_string()))?
    };
    Ok((doc, opts.into()))
}

#[cfg(feature = "wasm")]
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsError::new(&e.to_string()))
}

#[cfg(feature = "wasm")]
fn to_u32(indices: Vec<usize>) -> Vec<u32> {
    indices.into_iter().map(|i| i as u32).collect()
}

/// Whether a row can be dragged at all
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "canMoveRow")]
pub fn can_move_row_wasm(input: &str, row: usize, options: JsValue) -> Result<JsValue, JsError> {
    let (doc, opts) = parse(input, options)?;
    to_js(&crate::can_move_row(&doc, row, &opts))
}

/// Whether a column can be dragged at all
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "canMoveColumn")]
pub fn can_move_column_wasm(
    input: &str,
    column: usize,
    options: JsValue,
) -> Result<JsValue, JsError> {
    let (doc, opts) = parse(input, options)?;
    to_js(&crate::can_move_column(&doc, column, &opts))
}

#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "validateRowMove")]
pub fn validate_row_move_wasm(
    input: &str,
    from: usize,
    to: usize,
    options: JsValue,
) -> Result<JsValue, JsError> {
    let (doc, opts) = parse(input, options)?;
    to_js(&crate::validate_row_move(&doc, from, to, &opts))
}

#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "validateColumnMove")]
pub fn validate_column_move_wasm(
    input: &str,
    from: usize,
    to: usize,
    options: JsValue,
) -> Result<JsValue, JsError> {
    let (doc, opts) = parse(input, options)?;
    to_js(&crate::validate_column_move(&doc, from, to, &opts))
}

/// Legal drop targets for a dragged row
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "validRowDropPositions")]
pub fn valid_row_drop_positions_wasm(
    input: &str,
    source: usize,
    options: JsValue,
) -> Result<Vec<u32>, JsError> {
    let (doc, opts) = parse(input, options)?;
    Ok(to_u32(crate::valid_row_drop_positions(&doc, source, &opts)))
}

/// Legal drop targets for a dragged column
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "validColumnDropPositions")]
pub fn valid_column_drop_positions_wasm(
    input: &str,
    source: usize,
    options: JsValue,
) -> Result<Vec<u32>, JsError> {
    let (doc, opts) = parse(input, options)?;
    Ok(to_u32(crate::valid_column_drop_positions(&doc, source, &opts)))
}

#[cfg(feature = "wasm")]
fn run_move(
    input: &str,
    options: JsValue,
    validate: impl Fn(&MoveValidator<'_, Document>) -> MoveValidation,
    execute: impl Fn(&mut Document, &MoveOptions) -> bool,
) -> Result<JsValue, JsError> {
    let (mut doc, opts) = parse(input, options)?;
    let validation = match MoveValidator::new(&doc, &opts) {
        Ok(validator) => validate(&validator),
        Err(err) => MoveValidation::blocked(
            crate::BlockedBy::OutOfBounds,
            format!("Table geometry is malformed: {}", err),
        ),
    };

    let success = validation.can_move && execute(&mut doc, &opts);
    let output = if success {
        doc.to_notation()
    } else {
        input.to_string()
    };
    to_js(&MoveResult {
        output,
        success,
        validation,
    })
}

#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "moveRow")]
pub fn move_row_wasm(
    input: &str,
    from: usize,
    to: usize,
    options: JsValue,
) -> Result<JsValue, JsError> {
    run_move(
        input,
        options,
        |v| v.validate_row_move(from, to),
        |doc, opts| crate::execute_row_move(doc, from, to, opts),
    )
}

#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "moveColumn")]
pub fn move_column_wasm(
    input: &str,
    from: usize,
    to: usize,
    options: JsValue,
) -> Result<JsValue, JsError> {
    run_move(
        input,
        options,
        |v| v.validate_column_move(from, to),
        |doc, opts| crate::execute_column_move(doc, from, to, opts),
    )
}

/// Filled matrix of a table, shadows marked with `^` and `<`
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "describeGrid")]
pub fn describe_grid_wasm(input: &str, options: JsValue) -> Result<String, JsError> {
    let (doc, opts) = parse(input, options)?;
    let matrix = crate::FilledMatrix::build(&doc, opts.at.as_ref())
        .map_err(|e| JsError::new(&e.to_string()))?;
    Ok(matrix.describe(&doc))
}

/// Get version information
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "getVersion")]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
