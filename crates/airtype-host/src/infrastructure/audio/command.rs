//! Mixers driven through a command-line tool.

use std::io::ErrorKind;
use std::process::Command;

use crate::application::mute::{AudioError, MixerApi};

/// Builds the argument list for one mute request.
type ArgsFn = fn(bool) -> Vec<String>;

/// Runs an external program to set the mute flag.
pub struct CommandMixer {
    name: &'static str,
    program: &'static str,
    args: ArgsFn,
}

fn pactl_args(mute: bool) -> Vec<String> {
    vec![
        "set-sink-mute".into(),
        "@DEFAULT_SINK@".into(),
        if mute { "1" } else { "0" }.into(),
    ]
}

fn osascript_args(mute: bool) -> Vec<String> {
    vec!["-e".into(), format!("set volume output muted {mute}")]
}

impl CommandMixer {
    /// PulseAudio / PipeWire-Pulse.
    pub fn pactl() -> Self {
        Self {
            name: "pactl",
            program: "pactl",
            args: pactl_args,
        }
    }

    /// AppleScript's `set volume`.
    pub fn osascript() -> Self {
        Self {
            name: "osascript",
            program: "osascript",
            args: osascript_args,
        }
    }
}

impl MixerApi for CommandMixer {
    fn name(&self) -> &'static str {
        self.name
    }

    fn set_mute(&self, mute: bool) -> Result<(), AudioError> {
        let output = Command::new(self.program)
            .args((self.args)(mute))
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    AudioError::Unavailable(format!("{} is not installed", self.program))
                }
                _ => AudioError::Mixer(e.to_string()),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(AudioError::Mixer(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pactl_arguments() {
        assert_eq!(pactl_args(true), vec!["set-sink-mute", "@DEFAULT_SINK@", "1"]);
        assert_eq!(pactl_args(false)[2], "0");
    }

    #[test]
    fn test_osascript_arguments() {
        assert_eq!(
            osascript_args(false),
            vec!["-e", "set volume output muted false"]
        );
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let mixer = CommandMixer {
            name: "missing",
            program: "airtype-no-such-mixer-binary",
            args: pactl_args,
        };
        assert!(matches!(
            mixer.set_mute(true),
            Err(AudioError::Unavailable(_))
        ));
    }
}
