// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their mapping to domain values.
//!
//! Booleans are stored as `INTEGER` 0/1 and dates as ISO `YYYY-MM-DD` text.
//! Any stored value that no longer parses is surfaced as
//! `PersistenceError::ReconstructionError` instead of being skipped.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crewplan_audit::{ActionType, ActivityLogEntry, Actor, EntityType};
use crewplan_domain::{
    Allocation, DateRange, Department, DesignationSplit, EmpId, EmployeeType, ResourceMember,
    SoftBooking, format_iso_date, parse_iso_date,
};

use crate::diesel_schema::{
    activity_log, allocations, login_history, members, operators, sessions, soft_bookings,
};
use crate::error::PersistenceError;

fn reconstruction<E: std::fmt::Display>(what: &str) -> impl FnOnce(E) -> PersistenceError + '_ {
    move |e| PersistenceError::ReconstructionError(format!("{what}: {e}"))
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = members)]
pub struct MemberRow {
    pub member_id: i64,
    pub emp_id: String,
    pub name: String,
    pub designation: String,
    pub department: String,
    pub shift: String,
    pub employee_type: String,
    pub reporting_to: Option<String>,
    pub is_active: i32,
}

impl MemberRow {
    pub fn into_member(self) -> Result<ResourceMember, PersistenceError> {
        let department: Department =
            Department::from_str(&self.department).map_err(reconstruction("department"))?;
        let employee_type: EmployeeType = EmployeeType::from_str(&self.employee_type)
            .map_err(reconstruction("employee_type"))?;
        let mut member: ResourceMember = ResourceMember::new(
            EmpId::new(&self.emp_id),
            self.name,
            self.designation,
            department,
            self.shift,
            employee_type,
            self.reporting_to,
        )
        .with_id(self.member_id);
        member.is_active = self.is_active != 0;
        Ok(member)
    }
}

#[derive(Insertable)]
#[diesel(table_name = members)]
pub struct NewMember<'a> {
    pub member_id: Option<i64>,
    pub emp_id: &'a str,
    pub name: &'a str,
    pub designation: &'a str,
    pub department: &'a str,
    pub shift: &'a str,
    pub employee_type: &'a str,
    pub reporting_to: Option<&'a str>,
    pub is_active: i32,
}

impl<'a> NewMember<'a> {
    pub fn from_member(member: &'a ResourceMember) -> Self {
        Self {
            member_id: member.member_id,
            emp_id: member.emp_id.value(),
            name: &member.name,
            designation: &member.designation,
            department: member.department.as_str(),
            shift: &member.shift,
            employee_type: member.employee_type.as_str(),
            reporting_to: member.reporting_to.as_deref(),
            is_active: i32::from(member.is_active),
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = allocations)]
pub struct AllocationRow {
    pub allocation_id: i64,
    pub member_id: i64,
    pub allocation_date: String,
    pub show_name: Option<String>,
    pub shot_name: Option<String>,
    pub man_days: f64,
    pub is_leave: i32,
    pub is_idle: i32,
    pub is_weekend_working: i32,
    pub notes: Option<String>,
}

impl AllocationRow {
    pub fn into_allocation(self) -> Result<Allocation, PersistenceError> {
        Ok(Allocation {
            allocation_id: Some(self.allocation_id),
            member_id: self.member_id,
            allocation_date: parse_iso_date(&self.allocation_date)
                .map_err(reconstruction("allocation_date"))?,
            show_name: self.show_name,
            shot_name: self.shot_name,
            man_days: self.man_days,
            is_leave: self.is_leave != 0,
            is_idle: self.is_idle != 0,
            is_weekend_working: self.is_weekend_working != 0,
            notes: self.notes,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = allocations)]
pub struct NewAllocation<'a> {
    pub allocation_id: Option<i64>,
    pub member_id: i64,
    pub allocation_date: String,
    pub show_name: Option<&'a str>,
    pub shot_name: Option<&'a str>,
    pub man_days: f64,
    pub is_leave: i32,
    pub is_idle: i32,
    pub is_weekend_working: i32,
    pub notes: Option<&'a str>,
}

impl<'a> NewAllocation<'a> {
    pub fn from_allocation(allocation: &'a Allocation) -> Self {
        Self {
            allocation_id: allocation.allocation_id,
            member_id: allocation.member_id,
            allocation_date: format_iso_date(allocation.allocation_date),
            show_name: allocation.show_name.as_deref(),
            shot_name: allocation.shot_name.as_deref(),
            man_days: allocation.man_days,
            is_leave: i32::from(allocation.is_leave),
            is_idle: i32::from(allocation.is_idle),
            is_weekend_working: i32::from(allocation.is_weekend_working),
            notes: allocation.notes.as_deref(),
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = soft_bookings)]
pub struct SoftBookingRow {
    pub booking_id: i64,
    pub show_name: String,
    pub manager_name: String,
    pub department: String,
    pub man_days: f64,
    pub start_date: String,
    pub end_date: String,
    pub split_senior: Option<i32>,
    pub split_mid: Option<i32>,
    pub split_junior: Option<i32>,
    pub notes: Option<String>,
}

fn split_percent(value: i32) -> Result<u8, PersistenceError> {
    u8::try_from(value).map_err(reconstruction("designation split"))
}

impl SoftBookingRow {
    pub fn into_soft_booking(self) -> Result<SoftBooking, PersistenceError> {
        let department: Department =
            Department::from_str(&self.department).map_err(reconstruction("department"))?;
        let range: DateRange = DateRange::new(
            parse_iso_date(&self.start_date).map_err(reconstruction("start_date"))?,
            parse_iso_date(&self.end_date).map_err(reconstruction("end_date"))?,
        )
        .map_err(reconstruction("booking range"))?;
        let split: Option<DesignationSplit> =
            match (self.split_senior, self.split_mid, self.split_junior) {
                (Some(senior), Some(mid), Some(junior)) => Some(
                    DesignationSplit::new(
                        split_percent(senior)?,
                        split_percent(mid)?,
                        split_percent(junior)?,
                    )
                    .map_err(reconstruction("designation split"))?,
                ),
                _ => None,
            };

        let mut booking: SoftBooking = SoftBooking::new(
            &self.show_name,
            &self.manager_name,
            department,
            self.man_days,
            range,
            split,
        )
        .map_err(reconstruction("soft booking"))?
        .with_id(self.booking_id);
        booking.notes = self.notes;
        Ok(booking)
    }
}

#[derive(Insertable)]
#[diesel(table_name = soft_bookings)]
pub struct NewSoftBooking<'a> {
    pub booking_id: Option<i64>,
    pub show_name: &'a str,
    pub manager_name: &'a str,
    pub department: &'a str,
    pub man_days: f64,
    pub start_date: String,
    pub end_date: String,
    pub split_senior: Option<i32>,
    pub split_mid: Option<i32>,
    pub split_junior: Option<i32>,
    pub notes: Option<&'a str>,
}

impl<'a> NewSoftBooking<'a> {
    pub fn from_soft_booking(booking: &'a SoftBooking) -> Self {
        Self {
            booking_id: booking.booking_id,
            show_name: &booking.show_name,
            manager_name: &booking.manager_name,
            department: booking.department.as_str(),
            man_days: booking.man_days,
            start_date: format_iso_date(booking.range.start()),
            end_date: format_iso_date(booking.range.end()),
            split_senior: booking.split.map(|s| i32::from(s.senior())),
            split_mid: booking.split.map(|s| i32::from(s.mid())),
            split_junior: booking.split.map(|s| i32::from(s.junior())),
            notes: booking.notes.as_deref(),
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = activity_log)]
pub struct ActivityRow {
    pub log_id: i64,
    pub entity_type: String,
    pub entity_id: i64,
    pub action_type: String,
    pub field_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub actor_operator_id: Option<i64>,
    pub actor_login_name: String,
    pub actor_type: String,
    pub created_at: String,
    pub is_reversed: i32,
}

impl ActivityRow {
    pub fn into_entry(self) -> Result<ActivityLogEntry, PersistenceError> {
        Ok(ActivityLogEntry {
            log_id: Some(self.log_id),
            entity_type: EntityType::from_str(&self.entity_type)
                .map_err(reconstruction("entity_type"))?,
            entity_id: self.entity_id,
            action_type: ActionType::from_str(&self.action_type)
                .map_err(reconstruction("action_type"))?,
            field_name: self.field_name,
            old_value: self.old_value,
            new_value: self.new_value,
            actor: Actor {
                operator_id: self.actor_operator_id,
                login_name: self.actor_login_name,
                actor_type: self.actor_type,
            },
            created_at: Some(self.created_at),
            is_reversed: self.is_reversed != 0,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = activity_log)]
pub struct NewActivity<'a> {
    pub entity_type: &'a str,
    pub entity_id: i64,
    pub action_type: &'a str,
    pub field_name: Option<&'a str>,
    pub old_value: Option<&'a str>,
    pub new_value: Option<&'a str>,
    pub actor_operator_id: Option<i64>,
    pub actor_login_name: &'a str,
    pub actor_type: &'a str,
}

impl<'a> NewActivity<'a> {
    pub fn from_entry(entry: &'a ActivityLogEntry) -> Self {
        Self {
            entity_type: entry.entity_type.as_str(),
            entity_id: entry.entity_id,
            action_type: entry.action_type.as_str(),
            field_name: entry.field_name.as_deref(),
            old_value: entry.old_value.as_deref(),
            new_value: entry.new_value.as_deref(),
            actor_operator_id: entry.actor.operator_id,
            actor_login_name: &entry.actor.login_name,
            actor_type: &entry.actor.actor_type,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = operators)]
pub struct OperatorRow {
    pub operator_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    pub is_disabled: i32,
    pub created_at: String,
    pub disabled_at: Option<String>,
    pub last_login_at: Option<String>,
}

/// An operator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorData {
    pub operator_id: i64,
    /// Normalized to uppercase.
    pub login_name: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// `Admin`, `Manager` or `Viewer`.
    pub role: String,
    pub is_disabled: bool,
    pub created_at: String,
    pub disabled_at: Option<String>,
    pub last_login_at: Option<String>,
}

impl From<OperatorRow> for OperatorData {
    fn from(row: OperatorRow) -> Self {
        Self {
            operator_id: row.operator_id,
            login_name: row.login_name,
            display_name: row.display_name,
            password_hash: row.password_hash,
            role: row.role,
            is_disabled: row.is_disabled != 0,
            created_at: row.created_at,
            disabled_at: row.disabled_at,
            last_login_at: row.last_login_at,
        }
    }
}

/// A bearer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable, Selectable)]
#[diesel(table_name = sessions)]
pub struct SessionData {
    pub session_id: i64,
    #[serde(skip_serializing)]
    pub session_token: String,
    pub operator_id: i64,
    pub login_history_id: Option<i64>,
    pub created_at: String,
    pub last_activity_at: String,
    /// RFC 3339 timestamp.
    pub expires_at: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = login_history)]
pub struct LoginHistoryRow {
    pub login_history_id: i64,
    pub operator_id: Option<i64>,
    pub login_name: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub success: i32,
    pub login_at: String,
    pub logout_at: Option<String>,
}

/// One login attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginHistoryData {
    pub login_history_id: i64,
    pub operator_id: Option<i64>,
    pub login_name: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub success: bool,
    pub login_at: String,
    pub logout_at: Option<String>,
}

impl From<LoginHistoryRow> for LoginHistoryData {
    fn from(row: LoginHistoryRow) -> Self {
        Self {
            login_history_id: row.login_history_id,
            operator_id: row.operator_id,
            login_name: row.login_name,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            success: row.success != 0,
            login_at: row.login_at,
            logout_at: row.logout_at,
        }
    }
}

/// Login attempt details captured at the HTTP boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginAttempt {
    pub operator_id: Option<i64>,
    pub login_name: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub success: bool,
}

#[derive(Insertable)]
#[diesel(table_name = login_history)]
pub struct NewLoginHistory<'a> {
    pub operator_id: Option<i64>,
    pub login_name: &'a str,
    pub ip_address: Option<&'a str>,
    pub user_agent: Option<&'a str>,
    pub success: i32,
}

impl<'a> NewLoginHistory<'a> {
    pub fn from_attempt(attempt: &'a LoginAttempt) -> Self {
        Self {
            operator_id: attempt.operator_id,
            login_name: &attempt.login_name,
            ip_address: attempt.ip_address.as_deref(),
            user_agent: attempt.user_agent.as_deref(),
            success: i32::from(attempt.success),
        }
    }
}
