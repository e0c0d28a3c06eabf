mod common;

use common::*;
use knightwire::signaling::messages::ServerMessage;
use serde_json::json;

#[tokio::test]
async fn offer_reaches_target_with_sender_id() {
    let server = spawn_signaling_server().await;
    let mut white = register_peer(&server, "white-1").await;
    let mut black = register_peer(&server, "black-1").await;

    send_json(&mut white, offer_msg("black-1", "v=0 white")).await;

    assert_eq!(
        recv::<ServerMessage>(&mut black).await,
        ServerMessage::CreateOffer {
            sdp: json!({"type": "offer", "sdp": "v=0 white"}),
            sender_peer_id: Some("white-1".to_string()),
        }
    );
    assert_quiet(&mut white).await;
}

#[tokio::test]
async fn full_handshake_round_trip() {
    let server = spawn_signaling_server().await;
    let mut a = register_peer(&server, "A").await;
    let mut b = register_peer(&server, "B").await;

    send_json(&mut a, offer_msg("B", "offer-sdp")).await;
    assert!(matches!(
        recv::<ServerMessage>(&mut b).await,
        ServerMessage::CreateOffer { .. }
    ));

    send_json(
        &mut b,
        json!({"type": "createAnswer", "targetPeerId": "A", "sdp": {"type": "answer", "sdp": "answer-sdp"}}),
    )
    .await;
    assert_eq!(
        recv::<ServerMessage>(&mut a).await,
        ServerMessage::CreateAnswer {
            sdp: json!({"type": "answer", "sdp": "answer-sdp"}),
            sender_peer_id: Some("B".to_string()),
        }
    );

    let candidate = json!({"candidate": "candidate:1 1 udp 1 10.0.0.1 5000 typ host", "sdpMid": "0"});
    send_json(
        &mut a,
        json!({"type": "iceCandidate", "targetPeerId": "B", "candidate": candidate}),
    )
    .await;
    assert_eq!(
        recv::<ServerMessage>(&mut b).await,
        ServerMessage::IceCandidate {
            candidate,
            sender_peer_id: Some("A".to_string()),
        }
    );

    send_json(
        &mut a,
        json!({"type": "disconnect", "targetPeerId": "B", "playerColor": "white"}),
    )
    .await;
    assert_eq!(
        recv::<ServerMessage>(&mut b).await,
        ServerMessage::Disconnect {
            player_color: Some("white".to_string()),
            sender_peer_id: Some("A".to_string()),
        }
    );
}

#[tokio::test]
async fn reregistered_peer_id_routes_to_newest_connection() {
    let server = spawn_signaling_server().await;
    let mut first = register_peer(&server, "A").await;
    let mut second = register_peer(&server, "A").await;
    let mut sender = register_peer(&server, "C").await;

    send_json(&mut sender, offer_msg("A", "for A")).await;

    assert!(matches!(
        recv::<ServerMessage>(&mut second).await,
        ServerMessage::CreateOffer { .. }
    ));
    assert_quiet(&mut first).await;
}

#[tokio::test]
async fn stale_close_does_not_unregister_newer_peer() {
    let server = spawn_signaling_server().await;
    let mut first = register_peer(&server, "A").await;
    let mut second = register_peer(&server, "A").await;
    let mut sender = register_peer(&server, "C").await;

    first.close(None).await.unwrap();
    wait_for_presence(&mut sender, 2).await;

    send_json(&mut sender, offer_msg("A", "still there?")).await;

    assert!(matches!(
        recv::<ServerMessage>(&mut second).await,
        ServerMessage::CreateOffer { .. }
    ));
}

#[tokio::test]
async fn unknown_target_is_dropped_silently() {
    let server = spawn_signaling_server().await;
    let mut a = register_peer(&server, "A").await;

    send_json(&mut a, offer_msg("nobody", "hello")).await;
    assert_quiet(&mut a).await;

    // The connection keeps working afterwards
    let mut b = register_peer(&server, "B").await;
    send_json(&mut a, offer_msg("B", "hello again")).await;
    assert!(matches!(
        recv::<ServerMessage>(&mut b).await,
        ServerMessage::CreateOffer { .. }
    ));
}

#[tokio::test]
async fn malformed_signaling_frames_are_ignored() {
    let server = spawn_signaling_server().await;
    let mut a = register_peer(&server, "A").await;
    let mut b = register_peer(&server, "B").await;

    send_json(&mut a, json!({"type": "createOffer", "sdp": {}})).await;
    send_json(&mut a, json!({"peerId": "typeless"})).await;
    send_json(&mut a, offer_msg("B", "valid")).await;

    assert_eq!(
        recv::<ServerMessage>(&mut b).await,
        ServerMessage::CreateOffer {
            sdp: json!({"type": "offer", "sdp": "valid"}),
            sender_peer_id: Some("A".to_string()),
        }
    );
}
