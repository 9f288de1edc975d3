use anyhow::Result;
use futures_util::StreamExt;
use zbus::{Connection, MessageStream};
use zvariant::OwnedValue;

use mpris_mock_player::player::{MockPlayer, OBJECT_PATH, PROPERTIES_INTERFACE};
use mpris_mock_player::store::PLAYER_INTERFACE;

// These tests need a real session bus. Enable with:
// MPRIS_MOCK_TEST_BUS=1 cargo test --test bus_integration -- --ignored

fn bus_tests_enabled() -> bool {
    std::env::var("MPRIS_MOCK_TEST_BUS").ok().as_deref() == Some("1")
}

#[tokio::test]
#[ignore]
async fn get_roundtrip_over_the_session_bus() -> Result<()> {
    if !bus_tests_enabled() {
        return Ok(());
    }
    let name = "org.mpris.MediaPlayer2.mocktestplayer.itest";

    let serve_conn = Connection::session().await?;
    let mut stream = MessageStream::from(&serve_conn);
    let player = MockPlayer::new();
    player.register(&serve_conn, name).await?;

    let dispatch_conn = serve_conn.clone();
    tokio::spawn(async move {
        while let Some(Ok(msg)) = stream.next().await {
            let _ = player.serve_call(&dispatch_conn, &msg).await;
        }
    });

    let client = Connection::session().await?;
    let proxy = zbus::Proxy::new(&client, name, OBJECT_PATH, PROPERTIES_INTERFACE).await?;

    let can_pause: OwnedValue = proxy.call("Get", &(PLAYER_INTERFACE, "CanPause")).await?;
    assert!(bool::try_from(can_pause)?);

    let status: OwnedValue = proxy.call("Get", &(PLAYER_INTERFACE, "PlaybackStatus")).await?;
    assert_eq!(String::try_from(status)?, "Playing");

    // Permissive miss: an unknown property answers with an empty string
    // instead of a bus error.
    let missing: OwnedValue = proxy.call("Get", &(PLAYER_INTERFACE, "NoSuchProperty")).await?;
    assert_eq!(String::try_from(missing)?, "");

    serve_conn.release_name(name).await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn properties_changed_reaches_a_subscriber() -> Result<()> {
    if !bus_tests_enabled() {
        return Ok(());
    }
    let name = "org.mpris.MediaPlayer2.mocktestplayer.signals";

    let serve_conn = Connection::session().await?;
    let player = MockPlayer::new();
    player.register(&serve_conn, name).await?;

    let client = Connection::session().await?;
    let proxy = zbus::Proxy::new(&client, name, OBJECT_PATH, PROPERTIES_INTERFACE).await?;
    let mut signals = proxy.receive_signal("PropertiesChanged").await?;

    let changed = std::collections::HashMap::from([(
        "PlaybackStatus",
        zvariant::Value::from("Paused"),
    )]);
    player
        .properties_changed(&serve_conn, PLAYER_INTERFACE, changed, &[])
        .await?;

    let msg = tokio::time::timeout(std::time::Duration::from_secs(2), signals.next())
        .await?
        .expect("signal stream ended");
    let body = msg.body();
    let (iface, changed, invalidated): (
        String,
        std::collections::HashMap<String, OwnedValue>,
        Vec<String>,
    ) = body.deserialize()?;
    assert_eq!(iface, PLAYER_INTERFACE);
    assert_eq!(
        String::try_from(changed["PlaybackStatus"].try_clone()?)?,
        "Paused"
    );
    assert!(invalidated.is_empty());

    serve_conn.release_name(name).await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn second_instance_cannot_take_the_name() -> Result<()> {
    if !bus_tests_enabled() {
        return Ok(());
    }
    let name = "org.mpris.MediaPlayer2.mocktestplayer.conflict";

    let first = Connection::session().await?;
    first.request_name(name).await?;

    let second = Connection::session().await?;
    assert!(second.request_name(name).await.is_err());

    // The first owner is unaffected by the failed grab.
    first.release_name(name).await?;
    Ok(())
}
