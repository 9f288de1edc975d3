use std::collections::HashMap;

use tracing::{debug, warn};
use zbus::message::{Message, Type};
use zbus::Connection;
use zvariant::Value;

use crate::store::PropertyStore;

/// Well-known name the fixture claims on the session bus.
pub const BUS_NAME: &str = "org.mpris.MediaPlayer2.mocktestplayer";
/// Object path every MPRIS player publishes under.
pub const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
/// The standard property-introspection interface we answer on.
pub const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

const UNKNOWN_METHOD: &str = "org.freedesktop.DBus.Error.UnknownMethod";
const INVALID_ARGS: &str = "org.freedesktop.DBus.Error.InvalidArgs";

/// The bus-facing player object: answers `Get`/`GetAll` against the fixed
/// [`PropertyStore`] and can emit `PropertiesChanged`.
///
/// Lookup misses deliberately reply with an empty-string variant instead of a
/// bus error. Existing harness tests probe for properties this stub does not
/// carry and expect an answer, not `UnknownProperty`.
pub struct MockPlayer {
    store: PropertyStore,
}

impl MockPlayer {
    pub fn new() -> Self {
        Self {
            store: PropertyStore::new(),
        }
    }

    /// Claim the well-known name. zbus requests without queueing, so a second
    /// instance racing for the same name gets `Error::NameTaken` here and the
    /// caller can fail startup loudly.
    pub async fn register(&self, connection: &Connection, bus_name: &str) -> zbus::Result<()> {
        connection.request_name(bus_name).await?;
        Ok(())
    }

    /// Answer one message from the dispatch loop, if it concerns us.
    pub async fn serve_call(&self, connection: &Connection, msg: &Message) -> zbus::Result<()> {
        if let Some(reply) = self.reply_for(msg)? {
            connection.send(&reply).await?;
        }
        Ok(())
    }

    /// Build the reply for a method call at our object path. Returns `None`
    /// for anything that is not ours to answer (signals, replies, other
    /// paths). Every call at our path gets some reply, so no caller is left
    /// waiting for its bus timeout.
    pub fn reply_for(&self, msg: &Message) -> zbus::Result<Option<Message>> {
        if msg.message_type() != Type::MethodCall {
            return Ok(None);
        }
        let header = msg.header();
        if header.path().map(|p| p.as_str()) != Some(OBJECT_PATH) {
            return Ok(None);
        }

        let interface = header.interface().map(|i| i.as_str());
        let member = header.member().map(|m| m.as_str());
        let reply = match (interface, member) {
            (Some(PROPERTIES_INTERFACE), Some("Get")) => {
                let body = msg.body();
                match body.deserialize::<(String, String)>() {
                    Ok((iface, prop)) => {
                        let value = match self.store.get(&iface, &prop) {
                            Some(v) => v.try_clone()?,
                            None => empty_value(),
                        };
                        debug!(interface = %iface, property = %prop, "answering Get");
                        Message::method_reply(msg)?.build(&value)?
                    }
                    Err(e) => invalid_args_reply(msg, &e)?,
                }
            }
            (Some(PROPERTIES_INTERFACE), Some("GetAll")) => {
                let body = msg.body();
                match body.deserialize::<(String,)>() {
                    Ok((iface,)) => {
                        let props = self.store.get_all(&iface);
                        debug!(interface = %iface, count = props.len(), "answering GetAll");
                        Message::method_reply(msg)?.build(&props)?
                    }
                    Err(e) => invalid_args_reply(msg, &e)?,
                }
            }
            (iface, member) => {
                warn!(interface = ?iface, member = ?member, "unknown method call");
                let text = format!(
                    "no such method: {}.{}",
                    iface.unwrap_or("<none>"),
                    member.unwrap_or("<none>")
                );
                Message::method_error(msg, UNKNOWN_METHOD)?.build(&text)?
            }
        };
        Ok(Some(reply))
    }

    /// Emit the standard `PropertiesChanged` signal from our object path.
    /// Never fired during a default run (the store is immutable); exposed so
    /// other fixtures can poke consumers of the change protocol.
    pub async fn properties_changed(
        &self,
        connection: &Connection,
        interface: &str,
        changed: HashMap<&str, Value<'_>>,
        invalidated: &[&str],
    ) -> zbus::Result<()> {
        connection
            .emit_signal(
                None::<&str>,
                OBJECT_PATH,
                PROPERTIES_INTERFACE,
                "PropertiesChanged",
                &(interface, changed, invalidated),
            )
            .await
    }
}

impl Default for MockPlayer {
    fn default() -> Self {
        Self::new()
    }
}

/// What a lookup miss turns into on the wire: the empty string, wrapped as a
/// variant.
fn empty_value() -> Value<'static> {
    Value::from("")
}

fn invalid_args_reply(call: &Message, err: &zbus::Error) -> zbus::Result<Message> {
    warn!(error = ?err, "malformed property call arguments");
    Message::method_error(call, INVALID_ARGS)?.build(&format!("malformed arguments: {err}"))
}
