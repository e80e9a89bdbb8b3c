use js_sys::{Array, Function, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[wasm_bindgen]
extern "C" {
    /// The Web Speech API recognizer, prefixed or not
    pub type SpeechRecognition;

    #[wasm_bindgen(method, setter)]
    fn set_lang(this: &SpeechRecognition, lang: &str);

    #[wasm_bindgen(method, setter)]
    fn set_continuous(this: &SpeechRecognition, continuous: bool);

    #[wasm_bindgen(method, setter = interimResults)]
    fn set_interim_results(this: &SpeechRecognition, interim: bool);

    #[wasm_bindgen(method, setter)]
    fn set_onresult(this: &SpeechRecognition, handler: Option<&Function>);

    #[wasm_bindgen(method, setter)]
    fn set_onerror(this: &SpeechRecognition, handler: Option<&Function>);

    #[wasm_bindgen(method, setter)]
    fn set_onend(this: &SpeechRecognition, handler: Option<&Function>);

    #[wasm_bindgen(method, catch)]
    fn start(this: &SpeechRecognition) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    fn stop(this: &SpeechRecognition) -> Result<(), JsValue>;
}

/// What a recognition callback reported
pub enum RecognitionSignal {
    Transcript { text: String, is_final: bool },
    Error(String),
    End,
}

/// A configured recognizer with its callbacks attached
pub struct Recognizer {
    inner: SpeechRecognition,
    _handlers: Vec<Closure<dyn FnMut(JsValue)>>,
}

impl Recognizer {
    /// Build a one-utterance recognizer with interim results. `None` when the
    /// browser has no speech recognition.
    pub fn create<F>(locale: &str, on_signal: F) -> Option<Self>
    where
        F: Fn(RecognitionSignal) + Clone + 'static,
    {
        let constructor = recognition_constructor()?;
        let inner: SpeechRecognition = match Reflect::construct(&constructor, &Array::new()) {
            Ok(value) => value.unchecked_into(),
            Err(e) => {
                log::warn!("Speech recognition constructor failed: {:?}", e);
                return None;
            }
        };
        inner.set_lang(locale);
        inner.set_continuous(false);
        inner.set_interim_results(true);

        let on_result = {
            let on_signal = on_signal.clone();
            Closure::wrap(Box::new(move |event: JsValue| {
                if let Some((text, is_final)) = read_result(&event) {
                    on_signal(RecognitionSignal::Transcript { text, is_final });
                }
            }) as Box<dyn FnMut(JsValue)>)
        };
        let on_error = {
            let on_signal = on_signal.clone();
            Closure::wrap(Box::new(move |event: JsValue| {
                let code = Reflect::get(&event, &JsValue::from_str("error"))
                    .ok()
                    .and_then(|v| v.as_string())
                    .unwrap_or_else(|| "unknown".to_string());
                on_signal(RecognitionSignal::Error(code));
            }) as Box<dyn FnMut(JsValue)>)
        };
        let on_end = Closure::wrap(Box::new(move |_: JsValue| {
            on_signal(RecognitionSignal::End);
        }) as Box<dyn FnMut(JsValue)>);

        inner.set_onresult(Some(on_result.as_ref().unchecked_ref()));
        inner.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        inner.set_onend(Some(on_end.as_ref().unchecked_ref()));

        Some(Self {
            inner,
            _handlers: vec![on_result, on_error, on_end],
        })
    }

    pub fn start(&self) -> Result<(), JsValue> {
        self.inner.start()
    }

    pub fn stop(&self) -> Result<(), JsValue> {
        self.inner.stop()
    }
}

fn recognition_constructor() -> Option<Function> {
    let window = crate::window().ok()?;
    ["SpeechRecognition", "webkitSpeechRecognition"]
        .iter()
        .filter_map(|name| Reflect::get(&window, &JsValue::from_str(name)).ok())
        .find(|value| value.is_function())
        .map(|value| value.unchecked_into::<Function>())
}

/// Latest transcript in a `SpeechRecognitionEvent`
fn read_result(event: &JsValue) -> Option<(String, bool)> {
    let index = Reflect::get(event, &JsValue::from_str("resultIndex")).ok()?.as_f64()? as u32;
    let results = Reflect::get(event, &JsValue::from_str("results")).ok()?;
    let result = Reflect::get_u32(&results, index).ok()?;
    let is_final = Reflect::get(&result, &JsValue::from_str("isFinal")).ok()?.is_truthy();
    let alternative = Reflect::get_u32(&result, 0).ok()?;
    let text = Reflect::get(&alternative, &JsValue::from_str("transcript")).ok()?.as_string()?;
    Some((text, is_final))
}
