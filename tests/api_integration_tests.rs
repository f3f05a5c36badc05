use dotenv::dotenv;
use kitchen_reconcile::advisor::{AdvisorError, CookingPreferences, KitchenAdvisor, OpenRouterAdvisor};
use kitchen_reconcile::api_connection::{ApiConnectionError, ChatCompletionRequest, ChatMessage, Provider};
use kitchen_reconcile::api_connection::endpoints::DEFAULT_MODEL;
use kitchen_reconcile::equipment_registry::{Equipment, EquipmentCondition};
use kitchen_reconcile::maintenance_reconciler::reconcile_payload;
use kitchen_reconcile::recommendation_merger::parse_recommendations;
use std::env;

const TEST_API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";

fn setup_test_environment() {
    dotenv().ok();
}

fn sample_equipment() -> Vec<Equipment> {
    vec![
        Equipment {
            id: 1,
            user_id: Some(1),
            name: "Cast Iron Skillet".to_string(),
            category: "Cookware".to_string(),
            condition: EquipmentCondition::Fair,
            purchase_date: None,
            last_maintenance_date: None,
            maintenance_interval: Some(60),
        },
        Equipment {
            id: 2,
            user_id: Some(1),
            name: "Espresso Machine".to_string(),
            category: "Appliances".to_string(),
            condition: EquipmentCondition::Good,
            purchase_date: None,
            last_maintenance_date: None,
            maintenance_interval: Some(30),
        },
    ]
}

#[tokio::test]
async fn test_missing_api_key_error() {
    setup_test_environment();
    let provider = Provider::openrouter("THIS_KEY_SHOULD_NOT_EXIST_IN_ENV_ABXYZ");
    let request = ChatCompletionRequest {
        model: DEFAULT_MODEL.to_string(),
        messages: vec![ChatMessage::user("Hello")],
        temperature: None,
        max_tokens: None,
    };
    let result = provider.call_chat_completion(request).await;
    assert!(matches!(result, Err(ApiConnectionError::MissingApiKey(_))));
    if let Err(ApiConnectionError::MissingApiKey(key_name)) = result {
        assert_eq!(key_name, "THIS_KEY_SHOULD_NOT_EXIST_IN_ENV_ABXYZ");
    }
}

#[tokio::test]
async fn test_advisor_surfaces_missing_key_as_typed_error() {
    setup_test_environment();
    let advisor = OpenRouterAdvisor::new("ANOTHER_KEY_THAT_IS_NOT_SET_QWERTY");
    let result = advisor
        .generate_maintenance_schedule(&sample_equipment(), &CookingPreferences::default())
        .await;
    assert!(matches!(
        result,
        Err(AdvisorError::Connection(ApiConnectionError::MissingApiKey(_)))
    ));
}

#[tokio::test]
#[ignore]
async fn test_live_maintenance_schedule_reconciles() {
    setup_test_environment();
    if env::var(TEST_API_KEY_ENV_VAR).is_err() {
        println!(
            "Skipping test_live_maintenance_schedule_reconciles: {} not set.",
            TEST_API_KEY_ENV_VAR
        );
        return;
    }

    let equipment = sample_equipment();
    let advisor = OpenRouterAdvisor::new(TEST_API_KEY_ENV_VAR);
    let payload = advisor
        .generate_maintenance_schedule(&equipment, &CookingPreferences::default())
        .await
        .expect("advisor call failed");

    let schedule = reconcile_payload(&equipment, &payload);
    assert!(schedule.len() <= equipment.len() + 1);
    assert!(schedule
        .windows(2)
        .all(|w| w[0].next_maintenance_date <= w[1].next_maintenance_date));
}

#[tokio::test]
#[ignore]
async fn test_live_recommendations_parse() {
    setup_test_environment();
    if env::var(TEST_API_KEY_ENV_VAR).is_err() {
        println!(
            "Skipping test_live_recommendations_parse: {} not set.",
            TEST_API_KEY_ENV_VAR
        );
        return;
    }

    let advisor = OpenRouterAdvisor::new(TEST_API_KEY_ENV_VAR);
    let payload = advisor
        .generate_equipment_recommendations(&sample_equipment(), &CookingPreferences::default(), Some(200.0))
        .await
        .expect("advisor call failed");

    let recommendations = parse_recommendations(&payload);
    assert!(recommendations.is_ok(), "Unexpected payload shape: {}", payload);
}
