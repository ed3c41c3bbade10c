//! Keyboard chord matching for the save shortcut.
//!
//! Save is the only shortcut the core owns: Cmd+S on macOS, Ctrl+S
//! everywhere else. Chords with Shift or Alt are left to the menu layer
//! (Shift+S is "save as").

use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    /// Name of the primary command modifier.
    pub fn command_label(self) -> &'static str {
        match self {
            Self::MacOs => "Cmd",
            Self::Windows | Self::Linux => "Ctrl",
        }
    }
}

/// A key press with its modifier state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: char,
    pub ctrl: bool,
    /// Cmd on macOS, the Windows key elsewhere.
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyChord {
    pub fn new(key: char) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mods = [
            (self.ctrl, "Ctrl"),
            (self.meta, "Cmd"),
            (self.alt, "Alt"),
            (self.shift, "Shift"),
        ];
        for (_, name) in mods.iter().filter(|(held, _)| *held) {
            write!(f, "{name}+")?;
        }
        write!(f, "{}", self.key.to_ascii_uppercase())
    }
}

/// The chord that triggers an explicit save on `platform`.
pub fn save_shortcut(platform: Platform) -> KeyChord {
    match platform {
        Platform::MacOs => KeyChord::new('s').meta(),
        Platform::Windows | Platform::Linux => KeyChord::new('s').ctrl(),
    }
}

/// Whether `chord` is the platform's save shortcut.
pub fn is_save_shortcut(chord: KeyChord, platform: Platform) -> bool {
    if !chord.key.eq_ignore_ascii_case(&'s') || chord.shift || chord.alt {
        return false;
    }
    match platform {
        Platform::MacOs => chord.meta && !chord.ctrl,
        Platform::Windows | Platform::Linux => chord.ctrl && !chord.meta,
    }
}
