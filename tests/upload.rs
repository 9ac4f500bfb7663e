mod common;

use base64::{engine::general_purpose, Engine as _};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::SecretKey;
use monobank_functions::keys::{Address, PrivateKey, Wallet};
use monobank_functions::secrets::encrypt::decrypt_secrets;
use monobank_functions::secrets::{
    collect_secrets, upload_secrets, GatewaySecretsManager, JsonRpcProvider, UploadOptions,
    SEPOLIA_DON_ID, SEPOLIA_ROUTER_ADDRESS,
};
use monobank_functions::util::ErrorKind;
use rand::rngs::OsRng;
use serde_json::{json, Value};

const HARDHAT_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const COORDINATOR: &str = "0x1111111111111111111111111111111111111111";

fn wallet() -> Wallet {
    let key: PrivateKey = HARDHAT_KEY.parse().unwrap();
    Wallet::new(&key).unwrap()
}

fn router() -> Address {
    SEPOLIA_ROUTER_ADDRESS.parse().unwrap()
}

fn options(gateway_urls: Vec<String>) -> UploadOptions {
    UploadOptions {
        slot_id: 2,
        gateway_urls,
        minutes_until_expiration: 4320,
    }
}

fn reply(id: &Value, result: Value) -> (u16, String) {
    (200, json!({"jsonrpc": "2.0", "id": id, "result": result}).to_string())
}

/// An EVM node that knows the router and a coordinator holding `don_key`.
async fn node(don_key: Vec<u8>) -> (String, common::Log) {
    let coordinator_word = format!("0x{:0>64}", &COORDINATOR[2..]);
    let mut key_return = format!("{:064x}{:064x}", 32, don_key.len());
    key_return.push_str(&hex::encode(&don_key));
    let key_return = format!("0x{}", key_return);

    common::serve(move |recorded| {
        let request = recorded.json();
        let id = &request["id"];
        match request["method"].as_str() {
            Some("eth_chainId") => reply(id, json!("0xaa36a7")),
            Some("eth_call") => {
                let data = request["params"][0]["data"].as_str().unwrap_or_default();
                if data.starts_with("0xa9c9a918") {
                    reply(id, json!(coordinator_word))
                } else if data.starts_with("0xd328a91e") {
                    reply(id, json!(key_return))
                } else {
                    (200, json!({"jsonrpc": "2.0", "id": id, "error": {"code": 3, "message": "execution reverted"}}).to_string())
                }
            }
            _ => (200, json!({"jsonrpc": "2.0", "id": id, "error": {"code": -32601, "message": "method not found"}}).to_string()),
        }
    })
    .await
}

/// A gateway whose nodes answer with `accepted`.
async fn gateway(accepted: Vec<bool>) -> (String, common::Log) {
    common::serve(move |recorded| {
        let request = recorded.json();
        let node_responses: Vec<Value> = accepted
            .iter()
            .map(|success| {
                json!({"body": {"payload": {
                    "success": success,
                    "error_message": if *success { Value::Null } else { json!("slot is locked") },
                }}})
            })
            .collect();
        reply(
            &request["id"],
            json!({"body": {"payload": {"success": true, "node_responses": node_responses}}}),
        )
    })
    .await
}

fn secrets() -> monobank_functions::functions::Secrets {
    collect_secrets(
        Some("uXkS3cLq9kz0".to_string()),
        Some("UA213223130000026007233566001".to_string()),
    )
    .unwrap()
}

#[tokio::test]
async fn uploads_through_the_first_live_gateway() {
    let don = SecretKey::random(&mut OsRng);
    let point = don.public_key().to_encoded_point(false);
    let (node_url, node_log) = node(point.as_bytes()[1..].to_vec()).await;
    let (gateway_url, gateway_log) = gateway(vec![true, true, true]).await;
    let dead = common::dead_url().await;

    let provider = JsonRpcProvider::new(node_url).unwrap();
    let mut manager =
        GatewaySecretsManager::new(provider, wallet(), router(), SEPOLIA_DON_ID).unwrap();
    let version = upload_secrets(&mut manager, &secrets(), &options(vec![dead, gateway_url]))
        .await
        .unwrap();
    assert!(version > 1_700_000_000);

    let node_log = node_log.lock().unwrap();
    let methods: Vec<String> = node_log
        .iter()
        .map(|r| r.json()["method"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(methods, ["eth_chainId", "eth_call", "eth_call"]);
    assert_eq!(
        node_log[1].json()["params"][0]["to"],
        json!(SEPOLIA_ROUTER_ADDRESS.to_lowercase())
    );
    assert_eq!(node_log[2].json()["params"][0]["to"], json!(COORDINATOR));

    let gateway_log = gateway_log.lock().unwrap();
    assert_eq!(gateway_log.len(), 1);
    let message = gateway_log[0].json();
    assert_eq!(message["method"], "secrets_set");
    let body = &message["params"]["body"];
    assert_eq!(body["don_id"], SEPOLIA_DON_ID);
    assert_eq!(body["sender"], json!(wallet().address().to_lower_hex()));
    assert_eq!(body["payload"]["slot_id"], 2);
    assert_eq!(body["payload"]["version"], json!(version));

    let sealed = general_purpose::STANDARD
        .decode(body["payload"]["payload"].as_str().unwrap())
        .unwrap();
    assert_eq!(decrypt_secrets(&sealed, &don).unwrap(), secrets());
}

#[tokio::test]
async fn one_refusing_node_fails_the_upload() {
    let don = SecretKey::random(&mut OsRng);
    let (gateway_url, _) = gateway(vec![true, false]).await;
    let provider = JsonRpcProvider::new(common::dead_url().await).unwrap();
    let mut manager = GatewaySecretsManager::new(provider, wallet(), router(), SEPOLIA_DON_ID)
        .unwrap()
        .with_don_public_key(don.public_key());

    let err = upload_secrets(&mut manager, &secrets(), &options(vec![gateway_url]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Upload);
    assert_eq!(err.to_string(), "Failed to upload secrets to the DON");
}

#[tokio::test]
async fn no_node_responses_is_not_success() {
    let don = SecretKey::random(&mut OsRng);
    let (gateway_url, _) = gateway(Vec::new()).await;
    let provider = JsonRpcProvider::new(common::dead_url().await).unwrap();
    let mut manager = GatewaySecretsManager::new(provider, wallet(), router(), SEPOLIA_DON_ID)
        .unwrap()
        .with_don_public_key(don.public_key());

    let err = upload_secrets(&mut manager, &secrets(), &options(vec![gateway_url]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Upload);
}

#[tokio::test]
async fn every_gateway_down_is_a_transport_error() {
    let don = SecretKey::random(&mut OsRng);
    let provider = JsonRpcProvider::new(common::dead_url().await).unwrap();
    let mut manager = GatewaySecretsManager::new(provider, wallet(), router(), SEPOLIA_DON_ID)
        .unwrap()
        .with_don_public_key(don.public_key());

    let gateways = vec![common::dead_url().await, common::dead_url().await];
    let err = upload_secrets(&mut manager, &secrets(), &options(gateways))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn unreachable_node_fails_initialization() {
    let provider = JsonRpcProvider::new(common::dead_url().await).unwrap();
    let mut manager =
        GatewaySecretsManager::new(provider, wallet(), router(), SEPOLIA_DON_ID).unwrap();
    let (gateway_url, gateway_log) = gateway(vec![true]).await;

    let err = upload_secrets(&mut manager, &secrets(), &options(vec![gateway_url]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(gateway_log.lock().unwrap().is_empty());
}
