//! Declarative column schemas for the statistics tables.
//!
//! Every view is the same generic table driven by one of these schemas; the
//! schema fixes each column's value type, display label and whether it takes
//! part in search.

use crate::Entity;

/// Value type applied to a column at normalization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Numeric,
    Text,
}

/// How a cell is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellFormat {
    #[default]
    Plain,
    /// Rendered with a trailing `%`
    Percent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub id: String,
    pub label: String,
    pub hover: String,
    pub searchable: bool,
    pub value_type: ValueType,
    pub format: CellFormat,
}

impl ColumnSchema {
    /// A numeric statistic column.
    pub fn numeric(id: impl Into<String>, label: impl Into<String>, hover: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            hover: hover.into(),
            searchable: false,
            value_type: ValueType::Numeric,
            format: CellFormat::Plain,
        }
    }

    /// A text column.
    pub fn text(id: impl Into<String>, label: impl Into<String>, hover: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            hover: hover.into(),
            searchable: false,
            value_type: ValueType::Text,
            format: CellFormat::Plain,
        }
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn percent(mut self) -> Self {
        self.format = CellFormat::Percent;
        self
    }
}

/// Columns and source layout of one entity table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub entity: Entity,
    /// Key holding the record array in the static JSON format
    pub record_key: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn new(entity: Entity, record_key: impl Into<String>, columns: Vec<ColumnSchema>) -> Self {
        Self {
            entity,
            record_key: record_key.into(),
            columns,
        }
    }

    /// Built-in schema for an entity.
    pub fn for_entity(entity: Entity) -> Self {
        match entity {
            Entity::Skaters => Self::skaters(),
            Entity::Goalies => Self::goalies(),
            Entity::Teams => Self::teams(),
        }
    }

    pub fn skaters() -> Self {
        Self::new(
            Entity::Skaters,
            "players",
            vec![
                ColumnSchema::text("player", "Player", "Player").searchable(),
                ColumnSchema::text("team", "Team", "Team").searchable(),
                ColumnSchema::text("position", "Pos", "Position"),
                ColumnSchema::numeric("gamesPlayed", "GP", "Games Played"),
                ColumnSchema::numeric("goals", "G", "Goals"),
                ColumnSchema::numeric("assists", "A", "Assists"),
                ColumnSchema::numeric("points", "P", "Points"),
                ColumnSchema::numeric("pointsPerGame", "P/G", "Points Per Game"),
                ColumnSchema::numeric("overtimeGoals", "OTG", "Overtime Goals"),
                ColumnSchema::numeric("gameWinningGoals", "GWG", "Game Winning Goals"),
                ColumnSchema::numeric("shots", "S", "Shots"),
                ColumnSchema::numeric("shootingPercentage", "S%", "Shooting Percentage").percent(),
            ],
        )
    }

    pub fn goalies() -> Self {
        Self::new(
            Entity::Goalies,
            "players",
            vec![
                ColumnSchema::text("player", "Player", "Player").searchable(),
                ColumnSchema::text("team", "Team", "Team").searchable(),
                ColumnSchema::text("catches", "C", "Catches"),
                ColumnSchema::numeric("gamesPlayed", "GP", "Games Played"),
                ColumnSchema::numeric("wins", "W", "Wins"),
                ColumnSchema::numeric("losses", "L", "Losses"),
                ColumnSchema::numeric("shotsAgainst", "SA", "Shots Against"),
                ColumnSchema::numeric("saves", "S", "Saves"),
                ColumnSchema::numeric("goalsAgainst", "GA", "Goals Against"),
                ColumnSchema::numeric("shutouts", "S/O", "Shutouts"),
            ],
        )
    }

    pub fn teams() -> Self {
        Self::new(
            Entity::Teams,
            "teams",
            vec![
                ColumnSchema::text("team", "Team", "Team").searchable(),
                ColumnSchema::numeric("gamesPlayed", "GP", "Games Played"),
                ColumnSchema::numeric("wins", "W", "Wins"),
                ColumnSchema::numeric("losses", "L", "Losses"),
                ColumnSchema::numeric("ties", "T", "Ties"),
                ColumnSchema::numeric("overtimeLosses", "OL", "Overtime Losses"),
                ColumnSchema::numeric("points", "P", "Points"),
                ColumnSchema::numeric("goalsFor", "G/F", "Goals For"),
                ColumnSchema::numeric("goalsAgainst", "G/A", "Goals Against"),
            ],
        )
    }

    pub fn column(&self, id: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn column_ids(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.id.as_str()).collect()
    }

    /// Identifiers of the columns matched by search.
    pub fn searchable_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.searchable)
            .map(|c| c.id.as_str())
            .collect()
    }
}
