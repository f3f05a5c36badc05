use anyhow::{Context, Result};
use chrono::Local;

use kitchen_reconcile::advisor::{CookingPreferences, OpenRouterAdvisor};
use kitchen_reconcile::cache::FileCache;
use kitchen_reconcile::cli::{parse_args, Command, EquipmentCommand};
use kitchen_reconcile::config::AppConfig;
use kitchen_reconcile::equipment_registry::NewEquipment;
use kitchen_reconcile::kitchen_service::KitchenService;
use kitchen_reconcile::maintenance_reconciler::MaintenanceScheduleEntry;
use kitchen_reconcile::recommendation_merger::RecommendationCandidate;
use kitchen_reconcile::shopping_sync::SyncAction;
use kitchen_reconcile::storage::{self, JsonFileStore};

fn print_schedule(schedule: &[MaintenanceScheduleEntry]) {
    if schedule.is_empty() {
        println!("No maintenance scheduled.");
        return;
    }
    for entry in schedule {
        println!(
            "{}  [{}] {} (#{}): {}",
            entry.next_maintenance_date,
            entry.priority,
            entry.equipment_name,
            entry.equipment_id,
            entry.recommendation
        );
        if !entry.suggested_action.is_empty() {
            println!("            -> {}", entry.suggested_action);
        }
    }
}

fn print_recommendations(recommendations: &[RecommendationCandidate]) {
    if recommendations.is_empty() {
        println!("No recommendations.");
        return;
    }
    for rec in recommendations {
        let price = rec
            .estimated_price
            .as_ref()
            .map(|p| format!(" ~{}", p))
            .unwrap_or_default();
        println!("{:>12}  [{}] {} ({}){}", rec.id().0, rec.priority, rec.name, rec.category, price);
        if !rec.reason.is_empty() {
            println!("              {}", rec.reason);
        }
    }
}

fn run_equipment_command(store: &JsonFileStore, user_id: i64, command: EquipmentCommand) -> Result<()> {
    let mut registry = storage::load_registry(store, user_id)?;
    match command {
        EquipmentCommand::List => {
            for e in registry.iter() {
                println!("#{} {} ({}, {:?})", e.id, e.name, e.category, e.condition);
            }
        }
        EquipmentCommand::Add(args) => {
            let added = registry.add(NewEquipment {
                user_id: Some(user_id),
                name: args.name,
                category: args.category,
                maintenance_interval: args.interval,
                last_maintenance_date: args.last_maintained,
                ..Default::default()
            });
            println!("Added #{} {}", added.id, added.name);
            storage::save_registry(store, user_id, &registry)?;
        }
        EquipmentCommand::Remove { id } => match registry.remove(id) {
            Some(removed) => {
                println!("Removed #{} {}", removed.id, removed.name);
                storage::save_registry(store, user_id, &registry)?;
            }
            None => println!("No equipment with id {}", id),
        },
        EquipmentCommand::Due => {
            let today = Local::now().date_naive();
            let due = registry.due_for_maintenance(today);
            if due.is_empty() {
                println!("Nothing is due.");
            }
            for e in due {
                let due_date = e.next_due_date().map(|d| d.to_string()).unwrap_or_default();
                println!("#{} {} due {}", e.id, e.name, due_date);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = parse_args();
    let mut config = AppConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(path) = cli.cache_file {
        config.cache_file = path;
    }
    if let Some(user_id) = cli.user_id {
        config.user_id = user_id;
    }
    log::debug!("Configuration: {:?}", config);

    let store = JsonFileStore::new(&config.data_dir);
    let user_id = config.user_id;

    // Equipment commands only touch the data directory.
    let command = match cli.command {
        Command::Equipment(command) => return run_equipment_command(&store, user_id, command),
        other => other,
    };

    let cache = FileCache::open(&config.cache_file)
        .with_context(|| format!("Failed to open cache at {:?}", config.cache_file))?;
    let advisor = OpenRouterAdvisor::with_model(&config.api_key_env_var, &config.model);
    let mut service = KitchenService::new(store, advisor, cache);
    let preferences = CookingPreferences::default();

    match command {
        Command::Equipment(command) => run_equipment_command(service.store(), user_id, command)?,
        Command::Schedule { refresh } => {
            let schedule = if refresh {
                service.refresh_maintenance_schedule(user_id, &preferences).await?
            } else {
                service.cached_maintenance_schedule()
            };
            print_schedule(&schedule);
        }
        Command::Recommend { refresh, budget } => {
            let recommendations = if refresh {
                service.refresh_recommendations(user_id, &preferences, budget).await?
            } else {
                service.visible_recommendations()
            };
            print_recommendations(&recommendations);
        }
        Command::Dismiss { id } => {
            let remaining = service.dismiss_recommendation(id)?;
            println!("Dismissed {}. {} recommendation(s) left.", id, remaining.len());
        }
        Command::AddToList { id } => {
            let result = service.add_recommendation_to_shopping_list(user_id, id)?;
            match result.action {
                SyncAction::Added => println!("Added to '{}'.", result.list.title),
                SyncAction::Created => println!("Created a new '{}' list.", result.list.title),
                SyncAction::Duplicate => println!("Already on '{}'.", result.list.title),
            }
        }
    }

    Ok(())
}
