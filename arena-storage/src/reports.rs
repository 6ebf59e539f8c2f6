// Fixed analytical queries over the arena schema. Each one hand-names its
// output fields, which must line up with its select list.

use arena_core::{Error, QueryResult, Record, Result, Scalar};
use arena_query::{to_named_records, Placeholder, QueryBuilder, StatementPlan};
use sqlx::sqlite::SqliteConnection;
use tracing::{debug, warn};

use crate::database::Database;
use crate::executor::{self, db_error};

const TEAM_EARNINGS: &str = "SELECT teamName, SUM(earnings) AS totalEarnings
FROM ProPlayer
GROUP BY teamName";
const TEAM_EARNINGS_FIELDS: [&str; 2] = ["teamName", "totalEarnings"];

const HEADSHOT_LEADERS: &str = "SELECT w.riotID, w.gunName, w.headshotPercentage, p.rank
FROM WeaponStats w
JOIN Player p ON w.riotID = p.riotID
WHERE w.headshotPercentage > ?1";
const HEADSHOT_LEADERS_FIELDS: [&str; 4] = ["riotID", "gunName", "headshotPercentage", "rank"];

const AGENT_DEATH_TOTALS: &str = "SELECT agentName, SUM(kills) AS totalKills, SUM(deaths) AS totalDeaths
FROM PlayedInMatch
GROUP BY agentName
HAVING SUM(deaths) < ?1";
const AGENT_DEATH_TOTALS_FIELDS: [&str; 3] = ["agentName", "totalKills", "totalDeaths"];

const AVERAGE_SPIKES_PLANTED: &str = "SELECT AVG(spikeCount) AS avgSpikePlanted
FROM (SELECT matchId, COUNT(*) AS spikeCount
      FROM Round
      WHERE spikePlanted = 1
      GROUP BY matchId) spikeCountsPerMatch";

const AGENT_TABLE: &str = "Agent";
const AGENT_NAME: &str = "agentName";

// Relational division: matches in which every listed player appeared.
const CREATE_RIOT_IDS: &str = "CREATE TEMP TABLE IF NOT EXISTS temp_riot_ids (riotId TEXT)";
const CLEAR_RIOT_IDS: &str = "DELETE FROM temp.temp_riot_ids";
const INSERT_RIOT_ID: &str = "INSERT INTO temp.temp_riot_ids (riotId) VALUES (?1)";
const DROP_RIOT_IDS: &str = "DROP TABLE IF EXISTS temp.temp_riot_ids";
const MATCHES_WITH_ALL_PLAYERS: &str = r#"SELECT DISTINCT m.matchId, m.startTime, m.regionName, m.mapName
FROM "Match" m
WHERE NOT EXISTS (
    SELECT 1
    FROM temp.temp_riot_ids t
    WHERE NOT EXISTS (
        SELECT 1
        FROM PlayedInMatch p
        WHERE p.matchId = m.matchId
          AND p.riotId = t.riotId
    )
)
ORDER BY m.matchId"#;
const MATCH_FIELDS: [&str; 4] = ["matchId", "startTime", "regionName", "mapName"];

/// Canned reports sharing the store's connection pool.
#[derive(Clone, Debug)]
pub struct Reports {
    db: Database,
}

impl Reports {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Total earnings per pro team.
    pub async fn team_earnings(&self) -> Result<Vec<Record>> {
        self.named(
            StatementPlan::raw(TEAM_EARNINGS),
            &TEAM_EARNINGS_FIELDS,
            "Failed to execute Group By query",
        )
        .await
    }

    /// Weapon stats above a headshot percentage, joined with the player's rank.
    pub async fn headshot_leaders(&self, threshold: f64) -> Result<Vec<Record>> {
        self.named(
            StatementPlan::new(HEADSHOT_LEADERS, vec![Scalar::Float(threshold)]),
            &HEADSHOT_LEADERS_FIELDS,
            "Failed to fetch join query results",
        )
        .await
    }

    /// `agentName` plus the requested ability columns for every agent.
    ///
    /// Ability names are written into the statement as column identifiers.
    pub async fn agent_abilities(&self, abilities: &[String]) -> Result<Vec<Record>> {
        if abilities.is_empty() {
            return Err(Error::Validation("At least one ability is required.".to_string()));
        }

        let mut columns = Vec::with_capacity(abilities.len() + 1);
        columns.push(AGENT_NAME);
        columns.extend(abilities.iter().map(String::as_str));
        let plan = QueryBuilder::new(Placeholder::Question).select_columns(AGENT_TABLE, &columns)?;

        self.named(plan, &columns, "Failed to fetch projection").await
    }

    /// Kill and death totals per agent, keeping agents whose deaths stay under `threshold`.
    pub async fn agent_death_totals(&self, threshold: f64) -> Result<Vec<Record>> {
        self.named(
            StatementPlan::new(AGENT_DEATH_TOTALS, vec![Scalar::Float(threshold)]),
            &AGENT_DEATH_TOTALS_FIELDS,
            "Failed to fetch group by results",
        )
        .await
    }

    /// Matches in which every one of `riot_ids` played.
    ///
    /// The ids are staged in a connection-scoped temporary table, so the whole
    /// sequence runs on one pooled connection. The table is dropped afterwards
    /// even when the division query fails.
    pub async fn matches_with_all_players(&self, riot_ids: Vec<Scalar>) -> Result<Vec<Record>> {
        if riot_ids.is_empty() {
            return Err(Error::Validation("RiotIDs are required.".to_string()));
        }

        self.db
            .with_connection(move |conn| {
                Box::pin(async move {
                    let outcome = divide(conn, riot_ids).await;
                    if let Err(e) = executor::execute(conn, &StatementPlan::raw(DROP_RIOT_IDS)).await {
                        warn!("Failed to drop temp_riot_ids: {}", e);
                    }
                    let rows = outcome.map_err(db_error("Failed to divide matches"))?;
                    Ok(to_named_records(rows, &MATCH_FIELDS))
                })
            })
            .await
    }

    /// Average number of planted spikes per match, counting only matches with a plant.
    /// `0` when the query returns no row; `null` when there are no planted rounds.
    pub async fn average_spikes_planted(&self) -> Result<Scalar> {
        let result = self
            .query(
                StatementPlan::raw(AVERAGE_SPIKES_PLANTED),
                "Failed to fetch nested query results",
            )
            .await?;

        Ok(result
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .unwrap_or(Scalar::Int(0)))
    }

    async fn named<S: AsRef<str>>(
        &self,
        plan: StatementPlan,
        fields: &[S],
        context: &'static str,
    ) -> Result<Vec<Record>> {
        let result = self.query(plan, context).await?;
        debug!("Report returned {} rows", result.row_count());
        Ok(to_named_records(result.rows, fields))
    }

    async fn query(&self, plan: StatementPlan, context: &'static str) -> Result<QueryResult> {
        self.db
            .with_connection(move |conn| {
                Box::pin(async move { executor::fetch(conn, &plan).await.map_err(db_error(context)) })
            })
            .await
    }
}

async fn divide(
    conn: &mut SqliteConnection,
    riot_ids: Vec<Scalar>,
) -> std::result::Result<Vec<Vec<Scalar>>, sqlx::Error> {
    executor::execute(conn, &StatementPlan::raw(CREATE_RIOT_IDS)).await?;
    // A previous request may have been cut off before its drop ran.
    executor::execute(conn, &StatementPlan::raw(CLEAR_RIOT_IDS)).await?;
    for riot_id in riot_ids {
        executor::execute(conn, &StatementPlan::new(INSERT_RIOT_ID, vec![riot_id])).await?;
    }
    let result = executor::fetch(conn, &StatementPlan::raw(MATCHES_WITH_ALL_PLAYERS)).await?;
    Ok(result.rows)
}
