//! Browser binding (WASM only)
//!
//! Wraps DOM elements as [`Control`]s, hooks page-ready and `change` events,
//! and exports the attach functions to JavaScript.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlInputElement, HtmlOutputElement, HtmlSelectElement,
    HtmlTextAreaElement,
};

use crate::config::{ControlSelector, SyncConfig};
use crate::control::{Control, HasStringValue};
use crate::storage::LocalStore;
use crate::sync::Synchronizer;

/// Attribute on `<html>` naming the preset to attach at start-up
pub const PRESET_ATTRIBUTE: &str = "data-persist-preset";

/// Elements that carry a string value
#[derive(Clone)]
enum ValueElement {
    Input(HtmlInputElement),
    Select(HtmlSelectElement),
    TextArea(HtmlTextAreaElement),
    Output(HtmlOutputElement),
}

impl ValueElement {
    fn from_element(element: &Element) -> Option<Self> {
        if let Some(e) = element.dyn_ref::<HtmlInputElement>() {
            Some(ValueElement::Input(e.clone()))
        } else if let Some(e) = element.dyn_ref::<HtmlSelectElement>() {
            Some(ValueElement::Select(e.clone()))
        } else if let Some(e) = element.dyn_ref::<HtmlTextAreaElement>() {
            Some(ValueElement::TextArea(e.clone()))
        } else {
            element
                .dyn_ref::<HtmlOutputElement>()
                .map(|e| ValueElement::Output(e.clone()))
        }
    }
}

impl HasStringValue for ValueElement {
    fn value(&self) -> String {
        match self {
            ValueElement::Input(e) => e.value(),
            ValueElement::Select(e) => e.value(),
            ValueElement::TextArea(e) => e.value(),
            ValueElement::Output(e) => e.value(),
        }
    }

    fn set_value(&self, value: &str) {
        match self {
            ValueElement::Input(e) => e.set_value(value),
            ValueElement::Select(e) => e.set_value(value),
            ValueElement::TextArea(e) => e.set_value(value),
            ValueElement::Output(e) => e.set_value(value),
        }
    }
}

/// A DOM element seen as a [`Control`]
#[derive(Clone)]
pub struct DomControl {
    element: Element,
    valued: Option<ValueElement>,
}

impl DomControl {
    pub fn new(element: Element) -> Self {
        let valued = ValueElement::from_element(&element);
        Self { element, valued }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }
}

impl Control for DomControl {
    fn id(&self) -> String {
        self.element.id()
    }

    fn has_class(&self, class: &str) -> bool {
        self.element.class_list().contains(class)
    }

    fn value_capability(&self) -> Option<&dyn HasStringValue> {
        self.valued.as_ref().map(|v| v as &dyn HasStringValue)
    }

    fn previous_sibling(&self) -> Option<Self> {
        self.element.previous_element_sibling().map(DomControl::new)
    }
}

/// Query the document for the controls `selector` tracks
pub fn query_controls(
    document: &Document,
    selector: &ControlSelector,
) -> Result<Vec<DomControl>, JsValue> {
    let list = document.query_selector_all(&selector.to_css())?;
    let mut controls = Vec::with_capacity(list.length() as usize);
    for i in 0..list.length() {
        if let Some(element) = list.item(i).and_then(|node| node.dyn_into::<Element>().ok()) {
            controls.push(DomControl::new(element));
        }
    }
    Ok(controls)
}

/// Run `f` once the document is parsed, immediately if it already is
pub fn on_ready(document: &Document, f: impl FnOnce() + 'static) {
    if document.ready_state() == "loading" {
        let closure = Closure::once(f);
        let _ = document
            .add_event_listener_with_callback("DOMContentLoaded", closure.as_ref().unchecked_ref());
        closure.forget();
    } else {
        f();
    }
}

/// Restore stored values now and save on every `change` from a tracked control
fn start(document: Document, sync: Synchronizer<LocalStore>) {
    let controls = match query_controls(&document, &sync.config().selector) {
        Ok(controls) => controls,
        Err(e) => {
            log::warn!("Invalid control selector: {:?}", e);
            return;
        }
    };
    sync.restore(&controls);

    let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
        // Rescan so the snapshot covers the whole tracked set as it is now
        match query_controls(&document, &sync.config().selector) {
            Ok(controls) => sync.on_change(&controls),
            Err(e) => log::warn!("Invalid control selector: {:?}", e),
        }
    });
    for control in &controls {
        let _ = control
            .element()
            .add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
    }
    closure.forget();

    log::info!("Tracking {} controls", controls.len());
}

/// Attach a synchronizer for `config` to the current page
pub fn attach(config: SyncConfig) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        log::warn!("No document, not attaching");
        return;
    };
    let store = match LocalStore::open() {
        Ok(store) => store,
        Err(e) => {
            log::warn!("{}, values will not persist", e);
            return;
        }
    };

    log::info!("Attaching to {}", config.storage_key);
    let sync = Synchronizer::new(config, store);
    let ready_document = document.clone();
    on_ready(&document, move || start(ready_document, sync));
}

/// Preset named by `<html data-persist-preset>`, or the default preset
pub fn configured_preset() -> SyncConfig {
    let name = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
        .and_then(|el| el.get_attribute(PRESET_ATTRIBUTE));

    match name {
        Some(name) => SyncConfig::preset(&name).unwrap_or_else(|| {
            log::warn!("Unknown preset {:?}, using default", name);
            SyncConfig::default()
        }),
        None => SyncConfig::default(),
    }
}

/// Persist `.promptKnob` values under `promptKnobValues`
#[wasm_bindgen]
pub fn attach_prompt_knobs() {
    attach(SyncConfig::prompt_knobs());
}

/// Persist `.promptKnob` and `#promptModelSelect` under `persistentInputsValues`
#[wasm_bindgen]
pub fn attach_persistent_inputs() {
    attach(SyncConfig::persistent_inputs());
}

/// Persist controls described by a JSON configuration
#[wasm_bindgen]
pub fn attach_with_config(json: &str) -> Result<(), JsValue> {
    let config = SyncConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    attach(config);
    Ok(())
}

/// Forget the values stored under `storage_key`
#[wasm_bindgen]
pub fn clear_stored_values(storage_key: &str) {
    let config = SyncConfig {
        storage_key: storage_key.to_string(),
        ..SyncConfig::default()
    };
    match LocalStore::open() {
        Ok(store) => Synchronizer::new(config, store).clear(),
        Err(e) => log::warn!("{}", e),
    }
}
