//! Voice input over a platform speech-recognition capability.
//!
//! Recognition runs one utterance at a time (not continuous) with interim
//! results. Interim transcripts mirror into the input field; a final one
//! fills it and triggers a delayed submit.

use becabot_types::Error;
use std::time::Duration;

use crate::timer::{TimerKind, TimerSlot, TimerToken, TokenSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionState {
    Idle,
    Listening,
    Error,
}

/// Error codes reported by the recognition capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorCode {
    NoSpeech,
    AudioCapture,
    NotAllowed,
    Network,
    Aborted,
    Other(String),
}

impl RecognitionErrorCode {
    pub fn from_code(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeech,
            "audio-capture" => Self::AudioCapture,
            "not-allowed" => Self::NotAllowed,
            "network" => Self::Network,
            "aborted" => Self::Aborted,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::NoSpeech => "no-speech",
            Self::AudioCapture => "audio-capture",
            Self::NotAllowed => "not-allowed",
            Self::Network => "network",
            Self::Aborted => "aborted",
            Self::Other(code) => code,
        }
    }

    /// Message to show the user. `None` for a user-initiated abort.
    pub fn user_message(&self) -> Option<String> {
        let text = match self {
            Self::NoSpeech => "No se detectó voz. Inténtalo de nuevo.".to_string(),
            Self::AudioCapture => "No se encontró un micrófono. Verifica tu dispositivo.".to_string(),
            Self::NotAllowed => "Permiso de micrófono denegado. Habilítalo en tu navegador.".to_string(),
            Self::Network => "Error de red durante el reconocimiento de voz.".to_string(),
            Self::Aborted => return None,
            Self::Other(code) => format!("Error en el reconocimiento de voz: {}", code),
        };
        Some(text)
    }
}

impl From<RecognitionErrorCode> for Error {
    fn from(code: RecognitionErrorCode) -> Self {
        Error::Recognition {
            code: code.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    Toggle,
    /// The platform refused to start, e.g. because it was already running
    StartFailed(String),
    Interim(String),
    Final(String),
    Failed(String),
    Ended,
    TimerFired(TimerToken),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEffect {
    StartRecognition,
    StopRecognition,
    SetListening(bool),
    SetInput(String),
    StartTimer { token: TimerToken, delay: Duration },
    CancelTimer(TimerToken),
    /// Submit whatever the input field holds now
    Submit,
    Alert(String),
}

#[derive(Debug)]
pub struct VoiceInput {
    supported: bool,
    state: RecognitionState,
    auto_submit_delay: Duration,
    tokens: TokenSource,
    auto_submit: TimerSlot,
}

impl VoiceInput {
    pub fn new(supported: bool, auto_submit_delay: Duration) -> Self {
        Self {
            supported,
            state: RecognitionState::Idle,
            auto_submit_delay,
            tokens: TokenSource::default(),
            auto_submit: TimerSlot::default(),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn state(&self) -> RecognitionState {
        self.state
    }

    pub fn handle(&mut self, event: VoiceEvent) -> Vec<VoiceEffect> {
        let mut fx = Vec::new();
        match event {
            VoiceEvent::Toggle => {
                if !self.supported {
                    log::warn!("Voice input requested but unsupported");
                    fx.push(VoiceEffect::Alert(Error::UnsupportedCapability.to_string()));
                } else if self.state == RecognitionState::Listening {
                    fx.push(VoiceEffect::StopRecognition);
                } else {
                    self.state = RecognitionState::Listening;
                    fx.push(VoiceEffect::StartRecognition);
                    fx.push(VoiceEffect::SetListening(true));
                }
            }
            VoiceEvent::StartFailed(reason) => {
                log::warn!("Speech recognition did not start: {}", reason);
                self.state = RecognitionState::Idle;
                fx.push(VoiceEffect::SetListening(false));
            }
            VoiceEvent::Interim(text) => {
                if self.state == RecognitionState::Listening {
                    fx.push(VoiceEffect::SetInput(text));
                }
            }
            VoiceEvent::Final(text) => {
                fx.push(VoiceEffect::SetInput(text.clone()));
                if !text.trim().is_empty() {
                    let (token, replaced) = self.auto_submit.arm(&mut self.tokens, TimerKind::AutoSubmit);
                    if let Some(old) = replaced {
                        fx.push(VoiceEffect::CancelTimer(old));
                    }
                    fx.push(VoiceEffect::StartTimer {
                        token,
                        delay: self.auto_submit_delay,
                    });
                }
            }
            VoiceEvent::Failed(code) => {
                let code = RecognitionErrorCode::from_code(&code);
                self.state = RecognitionState::Error;
                fx.push(VoiceEffect::SetListening(false));
                match code.user_message() {
                    Some(message) => {
                        log::warn!("Speech recognition error: {}", code.as_str());
                        fx.push(VoiceEffect::Alert(message));
                    }
                    None => log::debug!("Speech recognition aborted"),
                }
            }
            VoiceEvent::Ended => {
                if self.state == RecognitionState::Listening {
                    self.state = RecognitionState::Idle;
                }
                fx.push(VoiceEffect::SetListening(false));
            }
            VoiceEvent::TimerFired(token) => {
                if self.auto_submit.fire(token) {
                    fx.push(VoiceEffect::Submit);
                }
            }
        }
        fx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice() -> VoiceInput {
        VoiceInput::new(true, Duration::from_millis(500))
    }

    fn timer(fx: &[VoiceEffect]) -> TimerToken {
        fx.iter()
            .find_map(|e| match e {
                VoiceEffect::StartTimer { token, .. } => Some(*token),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_error_table() {
        let cases = [
            ("no-speech", RecognitionErrorCode::NoSpeech),
            ("audio-capture", RecognitionErrorCode::AudioCapture),
            ("not-allowed", RecognitionErrorCode::NotAllowed),
            ("network", RecognitionErrorCode::Network),
            ("aborted", RecognitionErrorCode::Aborted),
        ];
        for (raw, code) in cases {
            assert_eq!(RecognitionErrorCode::from_code(raw), code);
            assert_eq!(code.as_str(), raw);
        }
        assert_eq!(
            RecognitionErrorCode::from_code("service-not-allowed"),
            RecognitionErrorCode::Other("service-not-allowed".to_string())
        );
        assert!(RecognitionErrorCode::Aborted.user_message().is_none());
        assert!(RecognitionErrorCode::Other("x".to_string()).user_message().unwrap().contains('x'));
    }

    #[test]
    fn test_toggle_starts_and_stops() {
        let mut v = voice();
        assert_eq!(
            v.handle(VoiceEvent::Toggle),
            vec![VoiceEffect::StartRecognition, VoiceEffect::SetListening(true)]
        );
        assert_eq!(v.state(), RecognitionState::Listening);
        assert_eq!(v.handle(VoiceEvent::Toggle), vec![VoiceEffect::StopRecognition]);
        v.handle(VoiceEvent::Ended);
        assert_eq!(v.state(), RecognitionState::Idle);
    }

    #[test]
    fn test_unsupported_alerts() {
        let mut v = VoiceInput::new(false, Duration::from_millis(500));
        let fx = v.handle(VoiceEvent::Toggle);
        assert!(matches!(&fx[..], [VoiceEffect::Alert(_)]));
        assert_eq!(v.state(), RecognitionState::Idle);
    }

    #[test]
    fn test_start_failure_recovers() {
        let mut v = voice();
        v.handle(VoiceEvent::Toggle);
        v.handle(VoiceEvent::StartFailed("InvalidStateError".to_string()));
        assert_eq!(v.state(), RecognitionState::Idle);
        assert_eq!(v.handle(VoiceEvent::Toggle)[0], VoiceEffect::StartRecognition);
    }

    #[test]
    fn test_final_transcript_auto_submits() {
        let mut v = voice();
        v.handle(VoiceEvent::Toggle);
        assert_eq!(
            v.handle(VoiceEvent::Interim("becas de".to_string())),
            vec![VoiceEffect::SetInput("becas de".to_string())]
        );
        let fx = v.handle(VoiceEvent::Final("becas deportivas".to_string()));
        assert_eq!(fx[0], VoiceEffect::SetInput("becas deportivas".to_string()));
        let token = timer(&fx);
        assert_eq!(v.handle(VoiceEvent::TimerFired(token)), vec![VoiceEffect::Submit]);
        assert!(v.handle(VoiceEvent::TimerFired(token)).is_empty());
    }

    #[test]
    fn test_empty_final_does_not_submit() {
        let mut v = voice();
        v.handle(VoiceEvent::Toggle);
        let fx = v.handle(VoiceEvent::Final("  ".to_string()));
        assert!(!fx.iter().any(|e| matches!(e, VoiceEffect::StartTimer { .. })));
    }

    #[test]
    fn test_aborted_is_silent() {
        let mut v = voice();
        v.handle(VoiceEvent::Toggle);
        let fx = v.handle(VoiceEvent::Failed("aborted".to_string()));
        assert_eq!(fx, vec![VoiceEffect::SetListening(false)]);
        assert_eq!(v.state(), RecognitionState::Error);

        let fx = v.handle(VoiceEvent::Failed("not-allowed".to_string()));
        assert!(fx.iter().any(|e| matches!(e, VoiceEffect::Alert(_))));
    }

    #[test]
    fn test_interim_ignored_when_not_listening() {
        let mut v = voice();
        assert!(v.handle(VoiceEvent::Interim("x".to_string())).is_empty());
    }
}
