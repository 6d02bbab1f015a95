//! Knob Keeper entry point
//!
//! On web, attaches the preset named on the page. Natively, runs a
//! save/reload cycle against in-memory controls.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

    log::info!("Knob Keeper starting...");
    knob_keeper::web::attach(knob_keeper::web::configured_preset());
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Knob Keeper (native) starting...");
    log::info!("Native mode has no DOM - run with `trunk serve` for the web version");

    println!("\nRunning save/reload cycle...");
    reload_cycle();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn reload_cycle() {
    use knob_keeper::{HasStringValue, MemoryControl, MemoryStore, SyncConfig, Synchronizer};

    fn page(temperature: &str) -> (MemoryControl, Vec<MemoryControl>) {
        let readout = MemoryControl::display(temperature).with_class("slider-out");
        let nodes = vec![
            readout.clone(),
            MemoryControl::input("temperature", temperature)
                .with_class("promptKnob")
                .after(&readout),
            MemoryControl::input("promptModelSelect", "text-davinci-003"),
            MemoryControl::input("textbox", ""),
        ];
        (readout, nodes)
    }

    let sync = Synchronizer::new(SyncConfig::persistent_inputs(), MemoryStore::new());

    // First visit: the user moves the slider
    let (_, nodes) = page("0.7");
    let tracked = sync.tracked(&nodes);
    sync.restore(&tracked);
    nodes[1].set_value("0.2");
    sync.on_change(&tracked);

    // Reload: a fresh page picks the value back up
    let (readout, nodes) = page("0.7");
    let tracked = sync.tracked(&nodes);
    let report = sync.restore(&tracked);

    if nodes[1].value() != "0.2" {
        log::warn!("Slider was not restored (got {:?})", nodes[1].value());
        return;
    }
    if readout.value() != "0.2" {
        log::warn!("Readout did not follow the slider (got {:?})", readout.value());
        return;
    }
    println!(
        "✓ Restored {} controls, {} companions",
        report.restored, report.companions
    );
}
