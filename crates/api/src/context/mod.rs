//! Application context - dependency injection container

use std::sync::Arc;

use showup_common::{Clock, SystemClock};
use showup_core::{
    AttendanceService, CalendarCredentialRepository, CalendarProvider, ContactRepository,
    ContactResolver, ExternalLedger, InvitationRepository, InvitationService, MeetingRepository,
    MeetingScheduler, Notifier, Reconciler, SettlementService, StakeLedger,
};
use showup_domain::{Config, Result, ShowupError};
use showup_infra::{
    ContractLedger, DbManager, EmailNotifier, GoogleCalendarProvider, HttpClient, LoggingNotifier,
    SqliteCalendarCredentialRepository, SqliteContactRepository, SqliteInvitationRepository,
    SqliteMeetingRepository, UnconfiguredLedger,
};
use tokio::task;
use tracing::{info, warn};

use crate::utils::health::{ComponentHealth, HealthStatus};

/// Outbound collaborators that tests replace with fakes.
pub struct Integrations {
    pub calendar: Arc<dyn CalendarProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub ledger: Arc<dyn ExternalLedger>,
    pub clock: Arc<dyn Clock>,
}

impl Integrations {
    /// Build the production adapters described by `config`.
    ///
    /// E-mail falls back to a logging notifier when disabled and the ledger
    /// to an adapter that reports itself unconfigured.
    pub fn from_config(
        config: &Config,
        credentials: Arc<dyn CalendarCredentialRepository>,
    ) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let http = HttpClient::from_config(&config.calendar)?;

        let calendar: Arc<dyn CalendarProvider> = Arc::new(GoogleCalendarProvider::new(
            http.clone(),
            config.calendar.api_base_url.clone(),
            credentials,
            Arc::clone(&clock),
        ));

        let notifier: Arc<dyn Notifier> = if config.email.enabled {
            Arc::new(EmailNotifier::from_config(http, &config.email)?)
        } else {
            info!("email delivery disabled; notifications will be logged");
            Arc::new(LoggingNotifier)
        };

        let ledger: Arc<dyn ExternalLedger> = match ContractLedger::from_config(&config.ledger)? {
            Some(ledger) => Arc::new(ledger),
            None => {
                warn!("external ledger not configured; reconciliation is unavailable");
                Arc::new(UnconfiguredLedger)
            }
        };

        Ok(Self { calendar, notifier, ledger, clock })
    }
}

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub clock: Arc<dyn Clock>,
    pub contacts: Arc<dyn ContactRepository>,
    pub credentials: Arc<dyn CalendarCredentialRepository>,
    pub resolver: Arc<ContactResolver>,
    pub stake_ledger: Arc<StakeLedger>,
    pub attendance: Arc<AttendanceService>,
    pub settlement: Arc<SettlementService>,
    pub invitations: Arc<InvitationService>,
    pub scheduler: Arc<MeetingScheduler>,
    pub reconciler: Arc<Reconciler>,
}

impl AppContext {
    /// Open the store, apply migrations and wire the production adapters.
    pub fn new(config: Config) -> Result<Self> {
        let db = Arc::new(DbManager::from_config(&config.database)?);
        db.run_migrations()?;

        let credentials: Arc<dyn CalendarCredentialRepository> =
            Arc::new(SqliteCalendarCredentialRepository::new(Arc::clone(&db)));
        let integrations = Integrations::from_config(&config, credentials)?;

        Ok(Self::with_integrations(config, db, integrations))
    }

    /// Wire services over an already-migrated store and the given adapters.
    pub fn with_integrations(
        config: Config,
        db: Arc<DbManager>,
        integrations: Integrations,
    ) -> Self {
        let Integrations { calendar, notifier, ledger, clock } = integrations;
        let staking = config.staking.clone();

        let meetings: Arc<dyn MeetingRepository> =
            Arc::new(SqliteMeetingRepository::new(Arc::clone(&db)));
        let invitation_store: Arc<dyn InvitationRepository> =
            Arc::new(SqliteInvitationRepository::new(Arc::clone(&db)));
        let contacts: Arc<dyn ContactRepository> =
            Arc::new(SqliteContactRepository::new(Arc::clone(&db)));
        let credentials: Arc<dyn CalendarCredentialRepository> =
            Arc::new(SqliteCalendarCredentialRepository::new(Arc::clone(&db)));

        let resolver = Arc::new(ContactResolver::new(Arc::clone(&contacts)));
        let invitations = Arc::new(InvitationService::new(
            Arc::clone(&invitation_store),
            Arc::clone(&meetings),
            Arc::clone(&notifier),
            Arc::clone(&clock),
            staking.clone(),
        ));
        let stake_ledger = Arc::new(StakeLedger::new(
            Arc::clone(&meetings),
            invitation_store,
            Arc::clone(&calendar),
            notifier,
            Arc::clone(&clock),
            staking.clone(),
        ));
        let attendance = Arc::new(AttendanceService::new(
            Arc::clone(&meetings),
            Arc::clone(&clock),
            staking.clone(),
        ));
        let settlement = Arc::new(SettlementService::new(
            Arc::clone(&meetings),
            Arc::clone(&clock),
            staking.clone(),
        ));
        let scheduler = Arc::new(MeetingScheduler::new(
            Arc::clone(&meetings),
            Arc::clone(&resolver),
            calendar,
            Arc::clone(&invitations),
            Arc::clone(&clock),
            staking,
        ));
        let reconciler = Arc::new(Reconciler::new(meetings, ledger, Arc::clone(&clock)));

        Self {
            config,
            db,
            clock,
            contacts,
            credentials,
            resolver,
            stake_ledger,
            attendance,
            settlement,
            invitations,
            scheduler,
            reconciler,
        }
    }

    /// Check the store and report which optional integrations are active.
    pub async fn health_check(&self) -> HealthStatus {
        let db = Arc::clone(&self.db);
        let database = match task::spawn_blocking(move || db.health_check()).await {
            Ok(Ok(())) => ComponentHealth::up("database"),
            Ok(Err(err)) => ComponentHealth::down("database", err.to_string()),
            Err(err) => ComponentHealth::down(
                "database",
                ShowupError::Internal(format!("health check task failed: {err}")).to_string(),
            ),
        };

        HealthStatus::from_components(
            vec![
                database,
                ComponentHealth::optional("email", self.config.email.enabled),
                ComponentHealth::optional(
                    "ledger",
                    self.config.ledger.rpc_url.is_some()
                        && self.config.ledger.contract_address.is_some(),
                ),
            ],
            self.clock.now(),
        )
    }
}
