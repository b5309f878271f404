// ==========================================
// 门店盘点值班轮转系统 - 轮转配置仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: rotation_config / rotation_member 表的数据访问
// ==========================================

use crate::domain::rotation::{RotationConfiguration, RotationMember, DEFAULT_CONFIG_ID};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::DATETIME_FMT;
use chrono::{Local, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// RotationConfigRepository - 轮转配置仓储
// ==========================================
pub struct RotationConfigRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RotationConfigRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询单例配置
    pub fn get(&self) -> RepositoryResult<Option<RotationConfiguration>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                r#"
                SELECT config_id, enabled, monthly_rebalance_enabled, created_at, updated_at
                FROM rotation_config
                WHERE config_id = ?1
                "#,
                params![DEFAULT_CONFIG_ID],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        match result {
            Some((config_id, enabled, rebalance, created, updated)) => {
                Ok(Some(RotationConfiguration {
                    config_id,
                    enabled: enabled != 0,
                    monthly_rebalance_enabled: rebalance != 0,
                    created_at: parse_datetime(&created)?,
                    updated_at: parse_datetime(&updated)?,
                }))
            }
            None => Ok(None),
        }
    }

    /// 获取或创建单例配置 (默认 enabled=1, monthly_rebalance_enabled=1)
    pub fn get_or_create(&self) -> RepositoryResult<RotationConfiguration> {
        if let Some(config) = self.get()? {
            return Ok(config);
        }

        let now = Local::now().naive_local();
        let now_str = now.format(DATETIME_FMT).to_string();
        {
            let conn = self.get_conn()?;
            // 并发创建时由主键约束兜底,冲突方读回已有行
            conn.execute(
                r#"
                INSERT OR IGNORE INTO rotation_config
                    (config_id, enabled, monthly_rebalance_enabled, created_at, updated_at)
                VALUES (?1, 1, 1, ?2, ?2)
                "#,
                params![DEFAULT_CONFIG_ID, now_str],
            )?;
        }

        self.get()?.ok_or_else(|| RepositoryError::NotFound {
            entity: "rotation_config".to_string(),
            id: DEFAULT_CONFIG_ID.to_string(),
        })
    }

    /// 更新总开关
    pub fn set_enabled(&self, enabled: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE rotation_config SET enabled = ?1, updated_at = ?2 WHERE config_id = ?3",
            params![
                enabled as i64,
                Local::now().naive_local().format(DATETIME_FMT).to_string(),
                DEFAULT_CONFIG_ID
            ],
        )?;
        Ok(())
    }

    /// 更新月度再平衡开关
    pub fn set_monthly_rebalance_enabled(&self, enabled: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE rotation_config SET monthly_rebalance_enabled = ?1, updated_at = ?2 WHERE config_id = ?3",
            params![
                enabled as i64,
                Local::now().naive_local().format(DATETIME_FMT).to_string(),
                DEFAULT_CONFIG_ID
            ],
        )?;
        Ok(())
    }

    /// 查询全部成员 (按 base_order_index 升序)
    pub fn list_members(&self) -> RepositoryResult<Vec<RotationMember>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT employee_id, base_order_index, active
            FROM rotation_member
            WHERE config_id = ?1
            ORDER BY base_order_index ASC
            "#,
        )?;

        let rows = stmt.query_map(params![DEFAULT_CONFIG_ID], |row| {
            Ok(RotationMember {
                employee_id: row.get(0)?,
                base_order_index: row.get(1)?,
                active: row.get::<_, i64>(2)? != 0,
            })
        })?;

        let mut members = Vec::new();
        for row in rows {
            members.push(row?);
        }
        Ok(members)
    }

    /// 查询活跃成员 (按 base_order_index 升序)
    pub fn list_active_members(&self) -> RepositoryResult<Vec<RotationMember>> {
        Ok(self
            .list_members()?
            .into_iter()
            .filter(|m| m.active)
            .collect())
    }

    /// 成员总数
    pub fn count_members(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM rotation_member WHERE config_id = ?1",
            params![DEFAULT_CONFIG_ID],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 批量插入成员 (播种专用,单事务)
    pub fn insert_members(&self, members: &[RotationMember]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut count = 0;
        for member in members {
            tx.execute(
                r#"
                INSERT INTO rotation_member (config_id, employee_id, base_order_index, active)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    DEFAULT_CONFIG_ID,
                    member.employee_id,
                    member.base_order_index,
                    member.active as i64
                ],
            )?;
            count += 1;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    /// 整体改写成员顺序 (再平衡专用,单事务)
    ///
    /// # 参数
    /// - order: (employee_id, 新 base_order_index) 列表
    ///
    /// 先整体平移避开 UNIQUE(config_id, base_order_index) 的瞬时冲突,
    /// 再逐个写入最终顺序
    pub fn rewrite_order(&self, order: &[(String, i32)]) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let offset = (order.len() as i32) + 1_000;
        tx.execute(
            "UPDATE rotation_member SET base_order_index = base_order_index + ?1 WHERE config_id = ?2",
            params![offset, DEFAULT_CONFIG_ID],
        )?;

        for (employee_id, index) in order {
            tx.execute(
                r#"
                UPDATE rotation_member SET base_order_index = ?1
                WHERE config_id = ?2 AND employee_id = ?3
                "#,
                params![index, DEFAULT_CONFIG_ID, employee_id],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }
}

fn parse_datetime(s: &str) -> RepositoryResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FMT)
        .map_err(|e| RepositoryError::ValidationError(format!("时间格式无效: {} ({})", s, e)))
}
