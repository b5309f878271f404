// ==========================================
// 门店盘点值班轮转系统 - 员工花名册仓储 (只读)
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 花名册由外部系统维护,本仓储只提供读取
// ==========================================

use crate::domain::employee::Employee;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// EmployeeRepository - 员工花名册仓储
// ==========================================
pub struct EmployeeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EmployeeRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按ID查询员工
    pub fn find_by_id(&self, employee_id: &str) -> RepositoryResult<Option<Employee>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                r#"
                SELECT employee_id, display_name, active, is_manager, excluded_from_duty
                FROM employee
                WHERE employee_id = ?1
                "#,
                params![employee_id],
                Self::map_row,
            )
            .optional()?;
        Ok(result)
    }

    /// 查询全部在职员工 (按员工ID稳定排序)
    pub fn list_active(&self) -> RepositoryResult<Vec<Employee>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT employee_id, display_name, active, is_manager, excluded_from_duty
            FROM employee
            WHERE active = 1
            ORDER BY employee_id ASC
            "#,
        )?;

        let rows = stmt.query_map([], Self::map_row)?;
        let mut employees = Vec::new();
        for row in rows {
            employees.push(row?);
        }
        Ok(employees)
    }

    /// 查询显示姓名 (未找到返回 None)
    pub fn display_name(&self, employee_id: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let result = conn
            .query_row(
                "SELECT display_name FROM employee WHERE employee_id = ?1",
                params![employee_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(result)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Employee> {
        Ok(Employee {
            employee_id: row.get(0)?,
            display_name: row.get(1)?,
            active: row.get::<_, i64>(2)? != 0,
            is_manager: row.get::<_, i64>(3)? != 0,
            excluded_from_duty: row.get::<_, i64>(4)? != 0,
        })
    }
}
