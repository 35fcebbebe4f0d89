mod common;

use serde_json::json;

use common::{big_catalog, start_server, Client};
use draft_api::draft::DraftState;

#[tokio::test]
async fn winston_draft_distributes_every_card() {
    let (addr, state) = start_server(big_catalog()).await;

    let mut owner = Client::connect(addr, "usr_owner", "Alice", "WINST1").await;
    owner.expect("sessionOptions").await;
    let mut other = Client::connect(addr, "usr_other", "Bob", "WINST1").await;
    other.expect("sessionOptions").await;

    owner.send("startWinstonDraft", json!(6)).await;
    owner.expect("startWinstonDraft").await;
    other.expect("startWinstonDraft").await;

    let mut sync = owner.expect("winstonDraftSync").await;
    other.expect("winstonDraftSync").await;

    let mut rounds = 0;
    loop {
        rounds += 1;
        assert!(rounds < 200, "winston draft failed to terminate");

        let current = sync["currentPlayer"].as_str().expect("current player");
        if current == owner.user_id {
            owner.send_signal("winstonDraftTakePile").await;
        } else {
            other.send_signal("winstonDraftTakePile").await;
        }

        let (owner_event, owner_data) = owner
            .expect_any(&["winstonDraftSync", "winstonDraftEnd"])
            .await;
        let (other_event, _) = other
            .expect_any(&["winstonDraftSync", "winstonDraftEnd"])
            .await;
        if owner_event == "winstonDraftEnd" {
            assert_eq!(other_event, "winstonDraftEnd");
            break;
        }
        sync = owner_data;
    }

    // Every one of the 6 x 14 generated cards ended up with a player.
    let session = state.registry.session(&"WINST1".to_string()).expect("session");
    let session = session.lock();
    match &session.draft {
        DraftState::Winston(draft) => {
            assert!(draft.ended);
            assert_eq!(draft.total_picked(), 6 * 14);
        }
        other => panic!("expected a winston draft, got {other:?}"),
    }
}

#[tokio::test]
async fn winston_skip_walks_the_piles() {
    let (addr, _state) = start_server(big_catalog()).await;

    let mut owner = Client::connect(addr, "usr_owner", "Alice", "WINST2").await;
    owner.expect("sessionOptions").await;
    let mut other = Client::connect(addr, "usr_other", "Bob", "WINST2").await;
    other.expect("sessionOptions").await;

    owner.send("startWinstonDraft", json!(6)).await;
    let first_sync = owner.expect("winstonDraftSync").await;
    assert_eq!(first_sync["currentPile"], 0);
    assert_eq!(first_sync["currentPlayer"], owner.user_id);

    // Owner skips pile 0: it grows by one, pile 1 becomes current, and it
    // is still the owner's turn.
    owner.send_signal("winstonDraftSkipPile").await;
    let sync = owner.expect("winstonDraftSync").await;
    assert_eq!(sync["currentPile"], 1);
    assert_eq!(sync["piles"][0].as_array().unwrap().len(), 2);
    assert_eq!(sync["currentPlayer"], owner.user_id);

    // Skipping the last pile grants a random pool card and passes the
    // turn.
    owner.send_signal("winstonDraftSkipPile").await;
    owner.expect("winstonDraftSync").await;
    owner.send_signal("winstonDraftSkipPile").await;
    owner.expect("winstonDraftRandomCard").await;
    let sync = owner.expect("winstonDraftSync").await;
    assert_eq!(sync["currentPlayer"], other.user_id);
}
