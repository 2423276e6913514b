use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::model::employee::Employee;
use crate::model::user::User;

/// Replacement fields for an employee update. All three are applied; the
/// record id never changes.
#[derive(Debug, Clone)]
pub struct EmployeeUpdate {
    pub name: String,
    pub designation: String,
    pub salary: f64,
}

/// Abstract persistence for account records. The store is the sole arbiter
/// of write ordering; last-writer-wins is acceptable.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Store` when the email is already registered.
    async fn create_user(&self, user: User) -> Result<(), AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_user_by_reset_token(&self, token: &str) -> Result<Option<User>, AppError>;
    /// Overwrites the stored record with the same id.
    async fn save_user(&self, user: &User) -> Result<(), AppError>;
    async fn count_users(&self) -> Result<usize, AppError>;
}

/// Abstract persistence for employee records.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn create_employee(&self, employee: Employee) -> Result<(), AppError>;
    async fn list_employees(&self) -> Result<Vec<Employee>, AppError>;
    async fn find_employee(&self, id: Uuid) -> Result<Option<Employee>, AppError>;
    async fn find_employee_by_name(&self, name: &str) -> Result<Option<Employee>, AppError>;
    /// Returns the number of records touched (0 or 1).
    async fn update_employee(&self, id: Uuid, update: EmployeeUpdate) -> Result<u64, AppError>;
    /// Returns the number of records removed (0 or 1). Deleting a missing
    /// id is a no-op, not an error.
    async fn delete_employee(&self, id: Uuid) -> Result<u64, AppError>;
    async fn delete_all_employees(&self) -> Result<u64, AppError>;
}

/// In-memory document store backing both collections. Employees keep
/// insertion order so the dashboard lists them the way they were added.
#[derive(Default)]
pub struct MemStore {
    users: RwLock<HashMap<Uuid, User>>,
    employees: RwLock<Vec<Employee>>,
}

#[async_trait]
impl UserStore for MemStore {
    async fn create_user(&self, user: User) -> Result<(), AppError> {
        let mut users = self.users.write().expect("user store lock poisoned");
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::Store(format!(
                "email {} is already registered",
                user.email
            )));
        }
        users.insert(user.id, user);
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().expect("user store lock poisoned");
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_reset_token(&self, token: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().expect("user store lock poisoned");
        Ok(users
            .values()
            .find(|u| u.reset_token.as_deref() == Some(token))
            .cloned())
    }

    async fn save_user(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().expect("user store lock poisoned");
        if !users.contains_key(&user.id) {
            return Err(AppError::NotFound("user"));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn count_users(&self) -> Result<usize, AppError> {
        let users = self.users.read().expect("user store lock poisoned");
        Ok(users.len())
    }
}

#[async_trait]
impl EmployeeStore for MemStore {
    async fn create_employee(&self, employee: Employee) -> Result<(), AppError> {
        let mut employees = self.employees.write().expect("employee store lock poisoned");
        employees.push(employee);
        Ok(())
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, AppError> {
        let employees = self.employees.read().expect("employee store lock poisoned");
        Ok(employees.clone())
    }

    async fn find_employee(&self, id: Uuid) -> Result<Option<Employee>, AppError> {
        let employees = self.employees.read().expect("employee store lock poisoned");
        Ok(employees.iter().find(|e| e.id == id).cloned())
    }

    async fn find_employee_by_name(&self, name: &str) -> Result<Option<Employee>, AppError> {
        let employees = self.employees.read().expect("employee store lock poisoned");
        Ok(employees.iter().find(|e| e.name == name).cloned())
    }

    async fn update_employee(&self, id: Uuid, update: EmployeeUpdate) -> Result<u64, AppError> {
        let mut employees = self.employees.write().expect("employee store lock poisoned");
        match employees.iter_mut().find(|e| e.id == id) {
            Some(employee) => {
                employee.name = update.name;
                employee.designation = update.designation;
                employee.salary = update.salary;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_employee(&self, id: Uuid) -> Result<u64, AppError> {
        let mut employees = self.employees.write().expect("employee store lock poisoned");
        let before = employees.len();
        employees.retain(|e| e.id != id);
        Ok((before - employees.len()) as u64)
    }

    async fn delete_all_employees(&self) -> Result<u64, AppError> {
        let mut employees = self.employees.write().expect("employee store lock poisoned");
        let removed = employees.len() as u64;
        employees.clear();
        Ok(removed)
    }
}
