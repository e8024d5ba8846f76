//! Application context shared by every command of one session

use mtg_common::CardIdentifier;

use crate::api::currency::{fetch_usd_to_brl, ExchangeRate};
use crate::api::github::GitHubStore;
use crate::api::scryfall::ScryfallClient;
use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::manager;
use crate::models::CardRecord;
use crate::pipeline::{enrich, reprice};
use crate::reconciler::{Reconciler, WriteOutcome};

/// Clients plus the state of one session: the last-loaded collection table,
/// the exchange rate of the current run and the edit authorization.
///
/// Nothing here outlives the process. [`AppContext::refresh`] drops the
/// cached table and rate so the next access reloads them.
pub struct AppContext {
    config: Config,
    http: reqwest::blocking::Client,
    scryfall: ScryfallClient,
    store: GitHubStore,
    table: Option<Vec<CardRecord>>,
    rate: Option<ExchangeRate>,
    authorized: bool,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let scryfall = ScryfallClient::new(&config.scryfall_url)
            .with_batch_size(config.batch_size)
            .with_batch_delay(config.batch_delay);
        let store = GitHubStore::new(
            &config.github_url,
            &config.repo,
            &config.path,
            &config.branch,
            config.token.clone(),
        );
        let authorized = config.edit_password.is_none();

        Ok(Self {
            config,
            http: reqwest::blocking::Client::new(),
            scryfall,
            store,
            table: None,
            rate: None,
            authorized,
        })
    }

    pub fn reconciler(&self) -> Reconciler<'_> {
        Reconciler::new(&self.store)
    }

    /// Unlocks editing if `password` matches the configured edit password
    pub fn authorize(&mut self, password: Option<&str>) -> bool {
        if let Some(expected) = self.config.edit_password.as_deref() {
            self.authorized = password == Some(expected);
            if !self.authorized {
                log::warn!("Wrong edit password");
            }
        }
        self.authorized
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    fn require_authorized(&self) -> Result<()> {
        if self.authorized {
            Ok(())
        } else {
            Err(SyncError::Unauthorized)
        }
    }

    /// Exchange rate for this run, fetched on first use
    pub fn exchange_rate(&mut self) -> ExchangeRate {
        if let Some(rate) = self.rate {
            return rate;
        }
        let rate = fetch_usd_to_brl(&self.http, &self.config.rate_url);
        self.rate = Some(rate);
        rate
    }

    /// The collection table, loaded from the remote store on first use
    pub fn table(&mut self) -> Result<&[CardRecord]> {
        if self.table.is_none() {
            let records = self.reconciler().load()?;
            self.table = Some(records);
        }
        Ok(self.table.as_deref().unwrap_or_default())
    }

    /// Forgets the cached table and exchange rate
    pub fn refresh(&mut self) {
        log::info!("Clearing session cache");
        self.table = None;
        self.rate = None;
    }

    fn after_write(&mut self, outcome: WriteOutcome) -> WriteOutcome {
        if outcome.success {
            self.table = None;
        }
        outcome
    }

    /// Bulk import: normalize, enrich and merge `rows` into the remote file
    pub fn import_rows(&mut self, rows: Vec<CardRecord>) -> Result<WriteOutcome> {
        self.require_authorized()?;
        let rate = self.exchange_rate();
        let enriched = enrich(&self.scryfall, rows, rate);
        if enriched.is_empty() {
            log::warn!("Import contained no usable rows");
        }
        let outcome = self.reconciler().merge_incremental(&enriched);
        Ok(self.after_write(outcome))
    }

    /// API-driven add of a single card; the card must exist on Scryfall
    pub fn add_card(
        &mut self,
        set_code: &str,
        collector_number: &str,
        owned_regular: u32,
        owned_foil: u32,
    ) -> Result<WriteOutcome> {
        self.require_authorized()?;
        let card = self.scryfall.fetch_card(set_code, collector_number)?;
        log::info!("Found {} ({})", card.name, card.identifier());

        let rate = self.exchange_rate();
        let mut record = CardRecord::new(set_code, collector_number, owned_regular, owned_foil);
        record.apply_details(&card.details(), rate);

        let outcome = self.reconciler().merge_incremental(&[record]);
        Ok(self.after_write(outcome))
    }

    fn edit_table<F>(&mut self, edit: F) -> Result<WriteOutcome>
    where
        F: FnOnce(&mut Vec<CardRecord>) -> Result<()>,
    {
        self.require_authorized()?;
        let mut table = self.table()?.to_vec();
        edit(&mut table)?;
        let outcome = self.reconciler().replace_all(&table);
        Ok(self.after_write(outcome))
    }

    /// Manual add without a Scryfall lookup: the row is added to (or summed
    /// into) the loaded table and the file is replaced. A missing remote file
    /// is created.
    pub fn add_manual(&mut self, record: CardRecord) -> Result<WriteOutcome> {
        self.require_authorized()?;
        let mut table = match self.table() {
            Ok(rows) => rows.to_vec(),
            Err(SyncError::MissingRemote(path)) => {
                log::info!("{path} does not exist yet, creating it");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        manager::add_or_increment(&mut table, record);
        let outcome = self.reconciler().replace_all(&table);
        Ok(self.after_write(outcome))
    }

    /// Manager edit: set the quantities of one card and replace the file
    pub fn edit_card(
        &mut self,
        key: &CardIdentifier,
        owned_regular: u32,
        owned_foil: u32,
    ) -> Result<WriteOutcome> {
        self.edit_table(|table| manager::set_quantities(table, key, owned_regular, owned_foil))
    }

    /// Manager delete: remove one card and replace the file
    pub fn delete_card(&mut self, key: &CardIdentifier) -> Result<WriteOutcome> {
        self.edit_table(|table| manager::remove(table, key).map(|_| ()))
    }

    /// Re-enriches the whole collection at today's prices and replaces the file
    pub fn refresh_prices(&mut self) -> Result<WriteOutcome> {
        self.require_authorized()?;
        self.refresh();
        let rows = self.table()?.to_vec();
        let rate = self.exchange_rate();
        let Some(repriced) = reprice(&self.scryfall, rows, rate) else {
            return Ok(WriteOutcome::failed(
                "Scryfall returned no card data; collection left unchanged",
            ));
        };
        let outcome = self.reconciler().replace_all(&repriced);
        Ok(self.after_write(outcome))
    }
}
