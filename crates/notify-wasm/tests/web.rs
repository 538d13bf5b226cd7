//! Browser-side checks of the JS bindings.

#![cfg(target_arch = "wasm32")]

use notify_wasm::{decode_notify, NotifyDecoder, NotifyView};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

const NOTIFY: &str = r#"["job", "00", "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff0403a1b20c", "ffffffff0100f2052a010000001976a914000000000000000000000000000000000000000088ac00000000", [], "20000000", "1d00ffff", "6553f100", true]"#;

#[wasm_bindgen_test]
fn decodes_notify_text() {
    let value = decode_notify(NOTIFY).unwrap();
    let view: NotifyView = serde_wasm_bindgen::from_value(value).unwrap();

    assert_eq!(view.height, Some(0x0cb2a1));
    assert_eq!(view.outputs.len(), 1);
    assert_eq!(view.outputs[0].address, "1111111111111111111114oLvT2");
    assert_eq!(view.outputs[0].value_satoshis, 5_000_000_000);
}

#[wasm_bindgen_test]
fn decodes_notify_object() {
    let message: serde_json::Value = serde_json::from_str(NOTIFY).unwrap();
    let js = serde_wasm_bindgen::to_value(&message).unwrap();

    let decoder = NotifyDecoder::new("mainnet").unwrap();
    let view: NotifyView = serde_wasm_bindgen::from_value(decoder.decode_value(js).unwrap()).unwrap();
    assert_eq!(view.job_id, "job");
}

#[wasm_bindgen_test]
fn rejects_bad_input() {
    let err = decode_notify("not json").unwrap_err();
    assert!(err.is_instance_of::<js_sys::Error>());
    assert!(NotifyDecoder::new("regtest").is_err());
}
