// Node telemetry database operations implementation

use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait};

use crate::db::DbError;
use crate::entity::nodes;
use crate::models::TelemetryReport;

/// Repository for the nodes table.
/// Records the last-seen state of each validator node reporting telemetry.
#[derive(Clone)]
pub struct NodeRepository {
    conn: DatabaseConnection,
}

impl NodeRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Upsert a node's last-seen state from a telemetry report.
    /// Uses on_conflict so repeated reports from the same node overwrite
    /// the previous row.
    pub async fn upsert(
        &self,
        report: &TelemetryReport,
        ip_address: &str,
        last_seen: i64,
    ) -> Result<(), DbError> {
        let moniker = report
            .moniker
            .clone()
            .unwrap_or_else(|| report.account_id.clone());

        let model = nodes::ActiveModel {
            node_id: Set(report.node_id.clone()),
            moniker: Set(moniker),
            account_id: Set(report.account_id.clone()),
            ip_address: Set(ip_address.to_string()),
            last_seen: Set(last_seen),
            last_height: Set(report.latest_block_height as i64),
        };

        nodes::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(nodes::Column::NodeId)
                    .update_columns([
                        nodes::Column::Moniker,
                        nodes::Column::AccountId,
                        nodes::Column::IpAddress,
                        nodes::Column::LastSeen,
                        nodes::Column::LastHeight,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    /// Get a node's stored state by id
    pub async fn get_by_node_id(&self, node_id: &str) -> Result<Option<nodes::Model>, DbError> {
        nodes::Entity::find_by_id(node_id.to_string())
            .one(&self.conn)
            .await
            .map_err(Into::into)
    }
}
