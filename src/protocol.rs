// MIT License - Copyright (c) 2026 Peter Wright
// Commands understood by lircd

/// A command that can be sent to lircd.
///
/// Commands encode to an ordered list of tokens which go on the wire joined
/// by single spaces. The first token is the command name, and lircd echoes
/// it back in the reply.
pub trait Command: Send + Sync {
    /// Encode the command and its arguments.
    fn encode(&self) -> Vec<String>;

    /// The command name used to match the reply.
    fn name(&self) -> String {
        self.encode().into_iter().next().unwrap_or_default()
    }
}

/// `SEND_ONCE`: send the IR signal for `button` on `remote`, then repeat it
/// `repeats` times. lircd clamps the count to its configured minimum and
/// `--repeat-max` (600 by default).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOnce {
    pub remote: String,
    pub button: String,
    pub repeats: Option<u32>,
}

impl Command for SendOnce {
    fn encode(&self) -> Vec<String> {
        let mut tokens = vec![
            "SEND_ONCE".to_string(),
            self.remote.clone(),
            self.button.clone(),
        ];
        if let Some(repeats) = self.repeats {
            tokens.push(repeats.to_string());
        }
        tokens
    }
}

/// `SEND_START`: repeat `button` until [`SendStop`] (bounded by repeat_max).
/// lircd refuses other send commands while repeating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendStart {
    pub remote: String,
    pub button: String,
}

impl Command for SendStart {
    fn encode(&self) -> Vec<String> {
        vec![
            "SEND_START".to_string(),
            self.remote.clone(),
            self.button.clone(),
        ]
    }
}

/// `SEND_STOP`: abort a [`SendStart`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendStop {
    pub remote: String,
    pub button: String,
}

impl Command for SendStop {
    fn encode(&self) -> Vec<String> {
        vec![
            "SEND_STOP".to_string(),
            self.remote.clone(),
            self.button.clone(),
        ]
    }
}

/// `LIST`: the defined remotes, or the buttons of one remote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct List {
    pub remote: Option<String>,
}

impl Command for List {
    fn encode(&self) -> Vec<String> {
        let mut tokens = vec!["LIST".to_string()];
        tokens.extend(self.remote.clone());
        tokens
    }
}

/// `SET_INPUTLOG`: log received pulse/space data to `path` (mode2 format),
/// or stop logging when `path` is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetInputLog {
    pub path: Option<String>,
}

impl Command for SetInputLog {
    fn encode(&self) -> Vec<String> {
        let mut tokens = vec!["SET_INPUTLOG".to_string()];
        tokens.extend(self.path.clone());
        tokens
    }
}

/// `DRV_OPTION`: pass a key/value option to the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrvOption {
    pub key: String,
    pub value: String,
}

impl Command for DrvOption {
    fn encode(&self) -> Vec<String> {
        vec![
            "DRV_OPTION".to_string(),
            self.key.clone(),
            self.value.clone(),
        ]
    }
}

/// `SIMULATE`: make lircd broadcast a decoded key to every client.
/// Only accepted when lircd runs with `--allow-simulate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulate {
    pub key: String,
    pub data: String,
}

impl Simulate {
    /// Build a simulate command whose payload follows the broadcast layout:
    /// 16 hex digits of code, 2 hex digits of repeat count, button, remote.
    pub fn button_press(code: u64, repeat: u8, button: &str, remote: &str) -> Self {
        Self {
            key: format!("{:016x}", code),
            data: format!("{:02x} {} {}", repeat, button, remote),
        }
    }
}

impl Command for Simulate {
    fn encode(&self) -> Vec<String> {
        vec!["SIMULATE".to_string(), self.key.clone(), self.data.clone()]
    }
}

/// `SET_TRANSMITTERS`: select the active transmitters by mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetTransmitters {
    pub mask: String,
}

impl Command for SetTransmitters {
    fn encode(&self) -> Vec<String> {
        vec!["SET_TRANSMITTERS".to_string(), self.mask.clone()]
    }
}

/// `VERSION`: lircd's version string as the single data line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Version;

impl Command for Version {
    fn encode(&self) -> Vec<String> {
        vec!["VERSION".to_string()]
    }
}

/// Any other command, given as its tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raw(pub Vec<String>);

impl Raw {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tokens.into_iter().map(Into::into).collect())
    }
}

impl Command for Raw {
    fn encode(&self) -> Vec<String> {
        self.0.clone()
    }
}

impl<C: Command + ?Sized> Command for &C {
    fn encode(&self) -> Vec<String> {
        (**self).encode()
    }
}

impl<C: Command + ?Sized> Command for Box<C> {
    fn encode(&self) -> Vec<String> {
        (**self).encode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(command: &dyn Command) -> String {
        command.encode().join(" ")
    }

    #[test]
    fn test_command_wire_strings() {
        assert_eq!(wire(&Version), "VERSION");
        assert_eq!(wire(&List::default()), "LIST");
        assert_eq!(
            wire(&List {
                remote: Some("DenonTuner".to_string())
            }),
            "LIST DenonTuner"
        );
        assert_eq!(
            wire(&SendStart {
                remote: "tv".to_string(),
                button: "KEY_VOLUMEUP".to_string()
            }),
            "SEND_START tv KEY_VOLUMEUP"
        );
        assert_eq!(
            wire(&SendStop {
                remote: "tv".to_string(),
                button: "KEY_VOLUMEUP".to_string()
            }),
            "SEND_STOP tv KEY_VOLUMEUP"
        );
        assert_eq!(
            wire(&DrvOption {
                key: "device".to_string(),
                value: "/dev/lirc1".to_string()
            }),
            "DRV_OPTION device /dev/lirc1"
        );
        assert_eq!(
            wire(&SetTransmitters {
                mask: "3".to_string()
            }),
            "SET_TRANSMITTERS 3"
        );
    }

    #[test]
    fn test_optional_arguments_are_omitted() {
        let once = SendOnce {
            remote: "DenonTuner".to_string(),
            button: "PROG-SCAN".to_string(),
            repeats: None,
        };
        assert_eq!(wire(&once), "SEND_ONCE DenonTuner PROG-SCAN");
        assert_eq!(
            wire(&SendOnce {
                repeats: Some(5),
                ..once
            }),
            "SEND_ONCE DenonTuner PROG-SCAN 5"
        );

        assert_eq!(wire(&SetInputLog::default()), "SET_INPUTLOG");
        assert_eq!(
            wire(&SetInputLog {
                path: Some("/tmp/ir.log".to_string())
            }),
            "SET_INPUTLOG /tmp/ir.log"
        );
    }

    #[test]
    fn test_simulate_button_press_layout() {
        let sim = Simulate::button_press(0x2a, 0, "KEY_POWER", "Television");
        assert_eq!(
            sim.encode(),
            vec![
                "SIMULATE".to_string(),
                "000000000000002a".to_string(),
                "00 KEY_POWER Television".to_string(),
            ]
        );
    }

    #[test]
    fn test_command_name() {
        assert_eq!(Version.name(), "VERSION");
        assert_eq!(Raw::new(["SEND_ONCE", "tv", "KEY_1"]).name(), "SEND_ONCE");
        assert_eq!(Raw::new(Vec::<String>::new()).name(), "");
        let boxed: Box<dyn Command> = Box::new(List::default());
        assert_eq!(boxed.name(), "LIST");
        assert_eq!((&Version).name(), "VERSION");
    }
}
