use std::collections::HashMap;

use zvariant::Value;

/// The one interface this fixture exposes properties for.
pub const PLAYER_INTERFACE: &str = "org.mpris.MediaPlayer2.Player";

/// Fixed property set served over `org.freedesktop.DBus.Properties`.
///
/// Two-level map: interface name -> property name -> value. Built once at
/// startup and never mutated afterwards, so it can be read from the dispatch
/// loop without any locking.
pub struct PropertyStore {
    interfaces: HashMap<String, HashMap<String, Value<'static>>>,
}

impl PropertyStore {
    pub fn new() -> Self {
        let mut player = HashMap::new();
        player.insert("PlaybackStatus".to_string(), Value::from("Playing"));
        player.insert("CanPlay".to_string(), Value::from(true));
        player.insert("CanPause".to_string(), Value::from(true));
        player.insert("CanStop".to_string(), Value::from(true));

        let mut interfaces = HashMap::new();
        interfaces.insert(PLAYER_INTERFACE.to_string(), player);
        Self { interfaces }
    }

    /// Two-level lookup. `None` on an unknown interface or an unknown
    /// property within a known interface; the wire layer decides what a miss
    /// maps to.
    pub fn get(&self, interface: &str, property: &str) -> Option<&Value<'static>> {
        self.interfaces.get(interface)?.get(property)
    }

    /// All properties of an interface, or an empty map if the interface is
    /// unknown. The stored values are strings and booleans only, so
    /// `try_clone` cannot hit its fd-carrying failure case.
    pub fn get_all(&self, interface: &str) -> HashMap<String, Value<'static>> {
        self.interfaces
            .get(interface)
            .map(|props| {
                props
                    .iter()
                    .map(|(name, value)| {
                        let value = value
                            .try_clone()
                            .expect("property values carry no file descriptors");
                        (name.clone(), value)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for PropertyStore {
    fn default() -> Self {
        Self::new()
    }
}
