//! # 음성 입력 (받아쓰기)
//!
//! 음성 인식 자체는 외부 협력자(`SpeechSession`)가 맡습니다.
//! 서버의 `RelayedSpeech`는 상태만 기록하고, 인식된 문장은 클라이언트가
//! `on_transcript`로 전달합니다. 전달된 문장은 선택 영역에 넣거나 본문 끝에 덧붙입니다.

use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use super::platform::EditingPlatform;
use crate::error::AppError;

#[derive(Debug, Error)]
pub enum DictationError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Dictation is not active")]
    NotActive,

    #[error("Speech session failed: {0}")]
    Session(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    /// 인식기에 넘기는 BCP 47 태그
    pub fn tag(self) -> &'static str {
        match self {
            Language::En => "en-US",
            Language::Es => "es-ES",
        }
    }
}

impl FromStr for Language {
    type Err = DictationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::En),
            "es" => Ok(Language::Es),
            other => Err(DictationError::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// 외부 음성 인식 세션
pub trait SpeechSession: Send {
    fn start(&mut self, language: Language) -> Result<(), DictationError>;
    fn end(&mut self);
}

/// 클라이언트가 인식 결과를 중계하는 세션. 상태만 기록합니다.
/// 이미 듣는 중에 다시 시작하면 브라우저 인식기처럼 거부합니다.
#[derive(Debug, Default)]
pub struct RelayedSpeech {
    running: Option<Language>,
}

impl SpeechSession for RelayedSpeech {
    fn start(&mut self, language: Language) -> Result<(), DictationError> {
        if let Some(running) = self.running {
            return Err(DictationError::Session(format!(
                "recognition already started ({})",
                running.tag()
            )));
        }
        tracing::info!(language = language.tag(), "Speech recognition started");
        self.running = Some(language);
        Ok(())
    }

    fn end(&mut self) {
        if self.running.take().is_none() {
            tracing::debug!("Speech recognition ended while not running");
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DictationStatus {
    pub listening: bool,
    pub language: Language,
}

pub struct Dictation {
    speech: Box<dyn SpeechSession>,
    language: Language,
    listening: bool,
}

impl Default for Dictation {
    fn default() -> Self {
        Self::new(Box::new(RelayedSpeech::default()))
    }
}

impl Dictation {
    pub fn new(speech: Box<dyn SpeechSession>) -> Self {
        Self {
            speech,
            language: Language::default(),
            listening: false,
        }
    }

    pub fn status(&self) -> DictationStatus {
        DictationStatus {
            listening: self.listening,
            language: self.language,
        }
    }

    /// 받아쓰기를 시작합니다. 언어를 주면 그 언어로 시작하고, 시작에 실패하면 언어는 그대로입니다.
    pub fn start(&mut self, language: Option<&str>) -> Result<Language, DictationError> {
        let language = match language {
            Some(code) => code.parse()?,
            None => self.language,
        };
        self.speech.start(language)?;
        self.language = language;
        self.listening = true;
        Ok(self.language)
    }

    /// 이미 멈춘 상태여도 세션의 `end`를 그대로 호출합니다.
    pub fn stop(&mut self) {
        self.speech.end();
        self.listening = false;
    }

    /// 다음 `start`부터 적용됩니다.
    pub fn set_language(&mut self, code: &str) -> Result<Language, DictationError> {
        self.language = code.parse()?;
        Ok(self.language)
    }

    /// 인식된 문장을 편집 표면에 넣습니다.
    pub fn on_transcript(
        &self,
        surface: &mut dyn EditingPlatform,
        text: &str,
    ) -> Result<(), AppError> {
        if !self.listening {
            return Err(DictationError::NotActive.into());
        }
        surface.insert_text(text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::surface::HtmlSurface;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingSpeech {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl SpeechSession for RecordingSpeech {
        fn start(&mut self, language: Language) -> Result<(), DictationError> {
            self.calls.lock().unwrap().push(format!("start {}", language.tag()));
            Ok(())
        }

        fn end(&mut self) {
            self.calls.lock().unwrap().push("end".into());
        }
    }

    #[test]
    fn language_codes() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::En);
        assert_eq!("es".parse::<Language>().unwrap(), Language::Es);
        assert!(matches!(
            "fr".parse::<Language>(),
            Err(DictationError::UnsupportedLanguage(code)) if code == "fr"
        ));
    }

    #[test]
    fn start_with_language_and_stop_twice() {
        let speech = RecordingSpeech::default();
        let mut dictation = Dictation::new(Box::new(speech.clone()));

        assert_eq!(dictation.start(Some("es")).unwrap(), Language::Es);
        assert!(dictation.status().listening);

        dictation.stop();
        dictation.stop();

        assert_eq!(
            *speech.calls.lock().unwrap(),
            vec!["start es-ES".to_string(), "end".into(), "end".into()]
        );
        assert!(!dictation.status().listening);
    }

    #[test]
    fn relayed_speech_refuses_second_start_until_ended() {
        let mut dictation = Dictation::default();
        dictation.start(None).unwrap();

        assert!(matches!(
            dictation.start(Some("es")),
            Err(DictationError::Session(_))
        ));

        assert_eq!(dictation.status().language, Language::En);

        dictation.stop();
        assert_eq!(dictation.start(Some("es")).unwrap(), Language::Es);
        assert!(dictation.status().listening);
    }

    #[test]
    fn set_language_rejects_unknown_code_and_keeps_previous() {
        let mut dictation = Dictation::default();
        dictation.set_language("es").unwrap();
        assert!(dictation.set_language("de").is_err());
        assert_eq!(dictation.status().language, Language::Es);
    }

    #[test]
    fn transcript_goes_into_surface_only_while_listening() {
        let mut dictation = Dictation::default();
        let mut surface = HtmlSurface::new("<p>Hi</p>");

        assert!(matches!(
            dictation.on_transcript(&mut surface, "hello"),
            Err(AppError::Validation(_))
        ));

        dictation.start(None).unwrap();
        dictation.on_transcript(&mut surface, " there").unwrap();
        assert_eq!(surface.content(), "<p>Hi</p> there");
    }
}
