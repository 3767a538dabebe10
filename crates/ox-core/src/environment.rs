//! Environment negotiation
//!
//! The environment callback is a single channel keyed by a command code.
//! Known codes are decoded into typed [`EnvCommand`] variants; anything else
//! travels as [`EnvCommand::Raw`] and a frontend must answer it as
//! unhandled.

use std::path::PathBuf;

use ox_input::Device;

use crate::callbacks::EnvironmentFn;
use crate::types::{GameGeometry, PixelFormat, Rotation};

/// Known environment command codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum EnvCommandId {
    SetRotation = 1,
    GetOverscan = 2,
    GetCanDupe = 3,
    SetMessage = 6,
    Shutdown = 7,
    SetPerformanceLevel = 8,
    GetSystemDirectory = 9,
    SetPixelFormat = 10,
    SetInputDescriptors = 11,
    GetVariable = 15,
    SetVariables = 16,
    GetVariableUpdate = 17,
    SetSupportNoGame = 18,
    GetSaveDirectory = 31,
    SetGeometry = 37,
    GetLanguage = 39,
}

impl EnvCommandId {
    pub fn from_code(code: u32) -> Option<Self> {
        let id = match code {
            1 => EnvCommandId::SetRotation,
            2 => EnvCommandId::GetOverscan,
            3 => EnvCommandId::GetCanDupe,
            6 => EnvCommandId::SetMessage,
            7 => EnvCommandId::Shutdown,
            8 => EnvCommandId::SetPerformanceLevel,
            9 => EnvCommandId::GetSystemDirectory,
            10 => EnvCommandId::SetPixelFormat,
            11 => EnvCommandId::SetInputDescriptors,
            15 => EnvCommandId::GetVariable,
            16 => EnvCommandId::SetVariables,
            17 => EnvCommandId::GetVariableUpdate,
            18 => EnvCommandId::SetSupportNoGame,
            31 => EnvCommandId::GetSaveDirectory,
            37 => EnvCommandId::SetGeometry,
            39 => EnvCommandId::GetLanguage,
            _ => return None,
        };
        Some(id)
    }

    pub fn code(&self) -> u32 {
        *self as u32
    }
}

/// On-screen message request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    /// Duration in frames
    pub frames: u32,
}

/// Human-readable binding of one input to a core action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDescriptor {
    pub port: u32,
    pub device: Device,
    pub index: u32,
    pub id: u32,
    pub description: String,
}

/// Option a core declares for the frontend to expose
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreVariable {
    pub key: String,
    pub description: String,
    /// Allowed values, first is the default
    pub choices: Vec<String>,
}

impl CoreVariable {
    pub fn new(key: impl Into<String>, description: impl Into<String>, choices: &[&str]) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            choices: choices.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Parse a declaration of the form `"Description; first|second|third"`
    pub fn parse(key: &str, declaration: &str) -> Option<Self> {
        let (description, choices) = declaration.split_once(';')?;
        let choices: Vec<String> = choices
            .split('|')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        if choices.is_empty() {
            return None;
        }
        Some(Self {
            key: key.to_string(),
            description: description.trim().to_string(),
            choices,
        })
    }

    pub fn default_value(&self) -> Option<&str> {
        self.choices.first().map(String::as_str)
    }

    pub fn accepts(&self, value: &str) -> bool {
        self.choices.iter().any(|c| c == value)
    }
}

/// Frontend language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    English,
    Japanese,
    French,
    Spanish,
    German,
    Italian,
    Dutch,
    Portuguese,
}

impl Language {
    /// Map an ISO 639-1 code, falling back to English
    pub fn from_code(code: &str) -> Self {
        match code.to_ascii_lowercase().as_str() {
            "ja" => Language::Japanese,
            "fr" => Language::French,
            "es" => Language::Spanish,
            "de" => Language::German,
            "it" => Language::Italian,
            "nl" => Language::Dutch,
            "pt" => Language::Portuguese,
            _ => Language::English,
        }
    }
}

/// A single environment request
///
/// Query variants carry a mutable slot the frontend fills in; the callback's
/// boolean result says whether the command was recognised and handled.
#[derive(Debug)]
pub enum EnvCommand<'a> {
    SetRotation(Rotation),
    GetOverscan(&'a mut bool),
    GetCanDupe(&'a mut bool),
    SetMessage(&'a Message),
    Shutdown,
    SetPerformanceLevel(u32),
    GetSystemDirectory(&'a mut Option<PathBuf>),
    SetPixelFormat(PixelFormat),
    SetInputDescriptors(&'a [InputDescriptor]),
    GetVariable {
        key: &'a str,
        value: &'a mut Option<String>,
    },
    SetVariables(&'a [CoreVariable]),
    GetVariableUpdate(&'a mut bool),
    SetSupportNoGame(bool),
    GetSaveDirectory(&'a mut Option<PathBuf>),
    SetGeometry(GameGeometry),
    GetLanguage(&'a mut Language),
    /// Command outside the typed set
    Raw { cmd: u32, data: &'a mut [u8] },
}

impl EnvCommand<'_> {
    /// Typed id, `None` for raw commands
    pub fn id(&self) -> Option<EnvCommandId> {
        let id = match self {
            EnvCommand::SetRotation(_) => EnvCommandId::SetRotation,
            EnvCommand::GetOverscan(_) => EnvCommandId::GetOverscan,
            EnvCommand::GetCanDupe(_) => EnvCommandId::GetCanDupe,
            EnvCommand::SetMessage(_) => EnvCommandId::SetMessage,
            EnvCommand::Shutdown => EnvCommandId::Shutdown,
            EnvCommand::SetPerformanceLevel(_) => EnvCommandId::SetPerformanceLevel,
            EnvCommand::GetSystemDirectory(_) => EnvCommandId::GetSystemDirectory,
            EnvCommand::SetPixelFormat(_) => EnvCommandId::SetPixelFormat,
            EnvCommand::SetInputDescriptors(_) => EnvCommandId::SetInputDescriptors,
            EnvCommand::GetVariable { .. } => EnvCommandId::GetVariable,
            EnvCommand::SetVariables(_) => EnvCommandId::SetVariables,
            EnvCommand::GetVariableUpdate(_) => EnvCommandId::GetVariableUpdate,
            EnvCommand::SetSupportNoGame(_) => EnvCommandId::SetSupportNoGame,
            EnvCommand::GetSaveDirectory(_) => EnvCommandId::GetSaveDirectory,
            EnvCommand::SetGeometry(_) => EnvCommandId::SetGeometry,
            EnvCommand::GetLanguage(_) => EnvCommandId::GetLanguage,
            EnvCommand::Raw { .. } => return None,
        };
        Some(id)
    }

    /// Raw command code
    pub fn code(&self) -> u32 {
        match self {
            EnvCommand::Raw { cmd, .. } => *cmd,
            other => other.id().map(|id| id.code()).unwrap_or(0),
        }
    }
}

/// What the host has learned from negotiation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Negotiated {
    /// Pixel format accepted by the frontend
    pub pixel_format: PixelFormat,
    /// Whether null video payloads are allowed
    pub can_dupe: bool,
    /// Latest geometry update accepted by the frontend
    pub geometry: Option<GameGeometry>,
    /// Core asked to shut down
    pub shutdown_requested: bool,
}

impl Negotiated {
    fn observe(&mut self, cmd: &EnvCommand<'_>) {
        match cmd {
            EnvCommand::SetPixelFormat(format) => self.pixel_format = *format,
            EnvCommand::GetCanDupe(value) => self.can_dupe = **value,
            EnvCommand::SetGeometry(geometry) => self.geometry = Some(*geometry),
            EnvCommand::Shutdown => self.shutdown_requested = true,
            _ => {}
        }
    }
}

/// Synchronous environment access handed to a core
///
/// Exists only for the duration of a host call, so a core can never keep the
/// frontend's callback.
pub struct EnvironmentPort<'a> {
    callback: Option<&'a mut EnvironmentFn>,
    negotiated: &'a mut Negotiated,
    trace: bool,
}

impl<'a> EnvironmentPort<'a> {
    pub(crate) fn new(
        callback: Option<&'a mut EnvironmentFn>,
        negotiated: &'a mut Negotiated,
        trace: bool,
    ) -> Self {
        Self {
            callback,
            negotiated,
            trace,
        }
    }

    /// Send a command; returns whether the frontend handled it
    pub fn call(&mut self, cmd: &mut EnvCommand<'_>) -> bool {
        let Some(callback) = self.callback.as_mut() else {
            return false;
        };

        let handled = callback(cmd);
        if self.trace {
            tracing::trace!("environment cmd {} -> {}", cmd.code(), handled);
        }
        if handled {
            self.negotiated.observe(cmd);
        }
        handled
    }

    pub fn negotiated(&self) -> &Negotiated {
        self.negotiated
    }

    /// Ask whether null video payloads are allowed
    pub fn can_dupe(&mut self) -> bool {
        let mut value = false;
        self.call(&mut EnvCommand::GetCanDupe(&mut value)) && value
    }

    pub fn overscan(&mut self) -> bool {
        let mut value = false;
        self.call(&mut EnvCommand::GetOverscan(&mut value)) && value
    }

    pub fn set_pixel_format(&mut self, format: PixelFormat) -> bool {
        self.call(&mut EnvCommand::SetPixelFormat(format))
    }

    pub fn set_rotation(&mut self, rotation: Rotation) -> bool {
        self.call(&mut EnvCommand::SetRotation(rotation))
    }

    pub fn set_geometry(&mut self, geometry: GameGeometry) -> bool {
        self.call(&mut EnvCommand::SetGeometry(geometry))
    }

    pub fn set_message(&mut self, text: impl Into<String>, frames: u32) -> bool {
        let message = Message {
            text: text.into(),
            frames,
        };
        self.call(&mut EnvCommand::SetMessage(&message))
    }

    pub fn shutdown(&mut self) -> bool {
        self.call(&mut EnvCommand::Shutdown)
    }

    pub fn set_input_descriptors(&mut self, descriptors: &[InputDescriptor]) -> bool {
        self.call(&mut EnvCommand::SetInputDescriptors(descriptors))
    }

    pub fn set_variables(&mut self, variables: &[CoreVariable]) -> bool {
        self.call(&mut EnvCommand::SetVariables(variables))
    }

    pub fn set_support_no_game(&mut self, supported: bool) -> bool {
        self.call(&mut EnvCommand::SetSupportNoGame(supported))
    }

    pub fn variable(&mut self, key: &str) -> Option<String> {
        let mut value = None;
        if self.call(&mut EnvCommand::GetVariable { key, value: &mut value }) {
            value
        } else {
            None
        }
    }

    /// Whether any variable changed since the last `variable` call
    pub fn variables_updated(&mut self) -> bool {
        let mut value = false;
        self.call(&mut EnvCommand::GetVariableUpdate(&mut value)) && value
    }

    pub fn system_directory(&mut self) -> Option<PathBuf> {
        let mut value = None;
        if self.call(&mut EnvCommand::GetSystemDirectory(&mut value)) {
            value
        } else {
            None
        }
    }

    pub fn save_directory(&mut self) -> Option<PathBuf> {
        let mut value = None;
        if self.call(&mut EnvCommand::GetSaveDirectory(&mut value)) {
            value
        } else {
            None
        }
    }

    pub fn language(&mut self) -> Language {
        let mut value = Language::default();
        if self.call(&mut EnvCommand::GetLanguage(&mut value)) {
            value
        } else {
            Language::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frontend() -> EnvironmentFn {
        Box::new(|cmd: &mut EnvCommand<'_>| match cmd {
            EnvCommand::GetCanDupe(value) => {
                **value = true;
                true
            }
            EnvCommand::GetVariable { key, value } if *key == "speed" => {
                **value = Some("fast".to_string());
                true
            }
            EnvCommand::SetPixelFormat(PixelFormat::Xrgb8888) => true,
            _ => false,
        })
    }

    #[test]
    fn test_command_codes() {
        assert_eq!(EnvCommandId::from_code(10), Some(EnvCommandId::SetPixelFormat));
        assert_eq!(EnvCommandId::GetLanguage.code(), 39);
        assert_eq!(EnvCommandId::from_code(4), None);

        let mut data = [0u8; 4];
        let raw = EnvCommand::Raw { cmd: 0x1_0000, data: &mut data };
        assert_eq!(raw.id(), None);
        assert_eq!(raw.code(), 0x1_0000);
    }

    #[test]
    fn test_port_helpers_record_negotiation() {
        let mut callback = frontend();
        let mut negotiated = Negotiated::default();
        let mut port = EnvironmentPort::new(Some(&mut callback), &mut negotiated, false);

        assert!(port.can_dupe());
        assert!(!port.set_pixel_format(PixelFormat::Rgb565));
        assert!(port.set_pixel_format(PixelFormat::Xrgb8888));
        assert_eq!(port.variable("speed").as_deref(), Some("fast"));
        assert_eq!(port.variable("other"), None);

        assert!(negotiated.can_dupe);
        assert_eq!(negotiated.pixel_format, PixelFormat::Xrgb8888);
    }

    #[test]
    fn test_unregistered_port_handles_nothing() {
        let mut negotiated = Negotiated::default();
        let mut port = EnvironmentPort::new(None, &mut negotiated, false);
        assert!(!port.shutdown());
        assert!(!negotiated.shutdown_requested);
    }

    #[test]
    fn test_variable_declaration_parse() {
        let var = CoreVariable::parse("nullcore_pattern", "Pattern; bars|checker").unwrap();
        assert_eq!(var.description, "Pattern");
        assert_eq!(var.default_value(), Some("bars"));
        assert!(var.accepts("checker"));
        assert!(CoreVariable::parse("k", "no choices").is_none());
    }
}
