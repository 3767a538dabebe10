//! Frontend answers to environment commands

use std::collections::BTreeMap;
use std::path::PathBuf;

use ox_core::config::Config;
use ox_core::{CoreVariable, EnvCommand, GameGeometry, InputDescriptor, Language, Message, PixelFormat, Rotation};
use tracing::{debug, info, warn};

/// Everything the core told the frontend during negotiation
#[derive(Debug, Clone, Default)]
pub struct NegotiatedState {
    pub pixel_format: PixelFormat,
    pub rotation: Rotation,
    pub geometry: Option<GameGeometry>,
    pub messages: Vec<Message>,
    pub variables: Vec<CoreVariable>,
    pub input_descriptors: Vec<InputDescriptor>,
    pub can_dupe: bool,
    pub support_no_game: bool,
    pub shutdown_requested: bool,
    pub performance_level: Option<u32>,
    /// Raw codes of commands answered "unhandled"
    pub unhandled: Vec<u32>,
}

/// Typed environment dispatcher backed by [`Config`]
#[derive(Debug)]
pub struct FrontendEnvironment {
    overscan: bool,
    allow_dupe: bool,
    system_dir: PathBuf,
    save_dir: PathBuf,
    language: Language,
    options: BTreeMap<String, String>,
    options_dirty: bool,
    state: NegotiatedState,
}

impl FrontendEnvironment {
    pub fn new(config: &Config) -> Self {
        Self {
            overscan: config.video.overscan,
            allow_dupe: config.video.allow_frame_dupe,
            system_dir: config.paths.system.clone(),
            save_dir: config.paths.saves.clone(),
            language: Language::default(),
            options: config.core_options.clone(),
            options_dirty: false,
            state: NegotiatedState::default(),
        }
    }

    pub fn state(&self) -> &NegotiatedState {
        &self.state
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Change a core option; the core sees it on its next update query
    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(var) = self.state.variables.iter().find(|v| v.key == key) {
            if !var.accepts(&value) {
                warn!("Option {}={} is not one of {:?}", key, value, var.choices);
            }
        }
        debug!("Core option {} = {}", key, value);
        self.options.insert(key, value);
        self.options_dirty = true;
    }

    /// Current value of a core option, falling back to its declared default
    pub fn option(&self, key: &str) -> Option<String> {
        if let Some(value) = self.options.get(key) {
            return Some(value.clone());
        }
        self.state
            .variables
            .iter()
            .find(|v| v.key == key)
            .and_then(|v| v.default_value())
            .map(str::to_string)
    }

    /// Take pending messages for display
    pub fn drain_messages(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.state.messages)
    }

    /// Forget per-game negotiation, keeping declared variables
    pub fn reset_for_game(&mut self) {
        let variables = std::mem::take(&mut self.state.variables);
        let support_no_game = self.state.support_no_game;
        self.state = NegotiatedState {
            variables,
            support_no_game,
            ..NegotiatedState::default()
        };
    }

    /// Answer a command; returns whether it was handled
    pub fn handle(&mut self, cmd: &mut EnvCommand<'_>) -> bool {
        match cmd {
            EnvCommand::SetRotation(rotation) => {
                self.state.rotation = *rotation;
                true
            }
            EnvCommand::GetOverscan(value) => {
                **value = self.overscan;
                true
            }
            EnvCommand::GetCanDupe(value) => {
                **value = self.allow_dupe;
                self.state.can_dupe = self.allow_dupe;
                true
            }
            EnvCommand::SetMessage(message) => {
                info!("Core message ({} frames): {}", message.frames, message.text);
                self.state.messages.push((*message).clone());
                true
            }
            EnvCommand::Shutdown => {
                info!("Core requested shutdown");
                self.state.shutdown_requested = true;
                true
            }
            EnvCommand::SetPerformanceLevel(level) => {
                self.state.performance_level = Some(*level);
                true
            }
            EnvCommand::GetSystemDirectory(value) => {
                **value = Some(self.system_dir.clone());
                true
            }
            EnvCommand::SetPixelFormat(format) => {
                self.state.pixel_format = *format;
                debug!("Pixel format -> {:?}", format);
                true
            }
            EnvCommand::SetInputDescriptors(descriptors) => {
                self.state.input_descriptors = descriptors.to_vec();
                true
            }
            EnvCommand::GetVariable { key, value } => {
                **value = self.option(key);
                self.options_dirty = false;
                value.is_some()
            }
            EnvCommand::SetVariables(variables) => {
                debug!("Core declared {} variables", variables.len());
                self.state.variables = variables.to_vec();
                true
            }
            EnvCommand::GetVariableUpdate(value) => {
                **value = self.options_dirty;
                true
            }
            EnvCommand::SetSupportNoGame(supported) => {
                self.state.support_no_game = *supported;
                true
            }
            EnvCommand::GetSaveDirectory(value) => {
                **value = Some(self.save_dir.clone());
                true
            }
            EnvCommand::SetGeometry(geometry) => {
                self.state.geometry = Some(*geometry);
                true
            }
            EnvCommand::GetLanguage(value) => {
                **value = self.language;
                true
            }
            EnvCommand::Raw { cmd, .. } => {
                warn!("Unhandled environment command {}", cmd);
                self.state.unhandled.push(*cmd);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> FrontendEnvironment {
        let mut config = Config::default();
        config.video.allow_frame_dupe = false;
        config
            .core_options
            .insert("speed".to_string(), "fast".to_string());
        FrontendEnvironment::new(&config)
    }

    #[test]
    fn test_queries_answer_from_config() {
        let mut env = env();
        let mut dupe = true;
        assert!(env.handle(&mut EnvCommand::GetCanDupe(&mut dupe)));
        assert!(!dupe);

        let mut dir = None;
        assert!(env.handle(&mut EnvCommand::GetSaveDirectory(&mut dir)));
        assert!(dir.unwrap().ends_with("saves"));

        let mut value = None;
        assert!(env.handle(&mut EnvCommand::GetVariable {
            key: "speed",
            value: &mut value
        }));
        assert_eq!(value.as_deref(), Some("fast"));
    }

    #[test]
    fn test_raw_command_unhandled() {
        let mut env = env();
        let mut data = [0u8; 4];
        assert!(!env.handle(&mut EnvCommand::Raw {
            cmd: 0xDEAD,
            data: &mut data
        }));
        assert_eq!(env.state().unhandled, vec![0xDEAD]);
    }

    #[test]
    fn test_declared_default_used() {
        let mut env = env();
        let vars = [CoreVariable::new("mode", "Mode", &["a", "b"])];
        assert!(env.handle(&mut EnvCommand::SetVariables(&vars)));
        assert_eq!(env.option("mode").as_deref(), Some("a"));
        assert_eq!(env.option("missing"), None);
    }

    #[test]
    fn test_option_update_flag() {
        let mut env = env();
        let mut updated = true;
        env.handle(&mut EnvCommand::GetVariableUpdate(&mut updated));
        assert!(!updated);

        env.set_option("speed", "slow");
        env.handle(&mut EnvCommand::GetVariableUpdate(&mut updated));
        assert!(updated);

        let mut value = None;
        env.handle(&mut EnvCommand::GetVariable {
            key: "speed",
            value: &mut value,
        });
        env.handle(&mut EnvCommand::GetVariableUpdate(&mut updated));
        assert!(!updated);
        assert_eq!(value.as_deref(), Some("slow"));
    }

    #[test]
    fn test_negotiation_recorded() {
        let mut env = env();
        env.handle(&mut EnvCommand::SetPixelFormat(PixelFormat::Rgb565));
        env.handle(&mut EnvCommand::SetPerformanceLevel(4));
        let message = Message {
            text: "hello".to_string(),
            frames: 60,
        };
        env.handle(&mut EnvCommand::SetMessage(&message));
        env.handle(&mut EnvCommand::Shutdown);

        assert_eq!(env.state().pixel_format, PixelFormat::Rgb565);
        assert_eq!(env.state().performance_level, Some(4));
        assert!(env.state().shutdown_requested);
        assert_eq!(env.drain_messages(), vec![message]);

        env.reset_for_game();
        assert_eq!(env.state().pixel_format, PixelFormat::Xrgb1555);
        assert!(!env.state().shutdown_requested);
    }
}
