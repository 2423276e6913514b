//! Employee CRUD handlers. Every route requires an authenticated session;
//! outcomes surface as a flash message plus a redirect to the dashboard.

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::session::AuthUser;
use crate::flash::{self, Flash};
use crate::model::employee::Employee;
use crate::pages;
use crate::state::AppState;
use crate::store::EmployeeUpdate;

#[derive(Deserialize)]
pub struct EmployeeForm {
    pub name: String,
    pub designation: String,
    pub salary: String,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
}

/// Required-field check shared by create and update.
fn parse_form(form: &EmployeeForm) -> Result<(String, String, f64), &'static str> {
    let name = form.name.trim();
    let designation = form.designation.trim();
    if name.is_empty() || designation.is_empty() {
        return Err("Name and designation are required");
    }
    let salary = form
        .salary
        .trim()
        .parse::<f64>()
        .map_err(|_| "Salary must be a number")?;
    Ok((name.to_string(), designation.to_string(), salary))
}

pub async fn dashboard(
    req: HttpRequest,
    _auth: AuthUser,
    state: web::Data<AppState>,
) -> HttpResponse {
    match state.employees.list_employees().await {
        Ok(employees) => {
            let flash = flash::peek(&req);
            pages::respond(&req, pages::dashboard(flash.as_ref(), &employees))
        }
        Err(e) => {
            error!(error = %e, "failed to list employees");
            flash::error_redirect("/dashboard", &format!("ERROR: {e}"))
        }
    }
}

pub async fn new_employee_page(req: HttpRequest, _auth: AuthUser) -> HttpResponse {
    let flash = flash::peek(&req);
    pages::respond(&req, pages::new_employee(flash.as_ref()))
}

pub async fn create_employee(
    req: HttpRequest,
    _auth: AuthUser,
    form: web::Form<EmployeeForm>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let (name, designation, salary) = match parse_form(&form) {
        Ok(fields) => fields,
        Err(msg) => {
            // validation failure re-renders the form instead of redirecting
            let flash = Flash::error(msg);
            return pages::respond(&req, pages::new_employee(Some(&flash)));
        }
    };

    match state
        .employees
        .create_employee(Employee::new(name, designation, salary))
        .await
    {
        Ok(()) => {
            info!("employee created");
            flash::success_redirect("/dashboard", "Employee data added to database successfully.")
        }
        Err(e) => flash::error_redirect("/dashboard", &format!("ERROR: {e}")),
    }
}

pub async fn search_page(req: HttpRequest, _auth: AuthUser) -> HttpResponse {
    let flash = flash::peek(&req);
    pages::respond(&req, pages::search(flash.as_ref(), "", None))
}

/// GET /employee?name= — first match by exact name, or none.
pub async fn search(
    req: HttpRequest,
    _auth: AuthUser,
    query: web::Query<SearchQuery>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let name = query.name.clone().unwrap_or_default();

    let result = if name.trim().is_empty() {
        None
    } else {
        match state.employees.find_employee_by_name(name.trim()).await {
            Ok(result) => result,
            Err(e) => return flash::error_redirect("/dashboard", &format!("ERROR: {e}")),
        }
    };

    let flash = flash::peek(&req);
    pages::respond(&req, pages::search(flash.as_ref(), &name, result.as_ref()))
}

pub async fn edit_page(
    req: HttpRequest,
    _auth: AuthUser,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let Ok(id) = Uuid::parse_str(&path.into_inner()) else {
        return flash::error_redirect("/dashboard", "Employee not found");
    };

    match state.employees.find_employee(id).await {
        Ok(Some(employee)) => {
            let flash = flash::peek(&req);
            pages::respond(&req, pages::edit(flash.as_ref(), &employee))
        }
        Ok(None) => flash::error_redirect("/dashboard", "Employee not found"),
        Err(e) => flash::error_redirect("/dashboard", &format!("ERROR: {e}")),
    }
}

pub async fn update_employee(
    _auth: AuthUser,
    path: web::Path<String>,
    form: web::Form<EmployeeForm>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let raw_id = path.into_inner();
    let Ok(id) = Uuid::parse_str(&raw_id) else {
        return flash::error_redirect("/dashboard", "Employee not found");
    };

    let (name, designation, salary) = match parse_form(&form) {
        Ok(fields) => fields,
        Err(msg) => return flash::error_redirect(&format!("/edit/{raw_id}"), msg),
    };

    let update = EmployeeUpdate {
        name,
        designation,
        salary,
    };

    match state.employees.update_employee(id, update).await {
        Ok(0) => flash::error_redirect("/dashboard", "Employee not found"),
        Ok(_) => {
            info!(%id, "employee updated");
            flash::success_redirect("/dashboard", "Employee data updated successfully.")
        }
        Err(e) => flash::error_redirect("/dashboard", &format!("ERROR: {e}")),
    }
}

/// Deleting a missing id reports not-found but stays a no-op.
pub async fn delete_employee(
    _auth: AuthUser,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let Ok(id) = Uuid::parse_str(&path.into_inner()) else {
        return flash::error_redirect("/dashboard", "Employee not found");
    };

    match state.employees.delete_employee(id).await {
        Ok(0) => flash::error_redirect("/dashboard", "Employee not found"),
        Ok(_) => {
            info!(%id, "employee deleted");
            flash::success_redirect("/dashboard", "Employee deleted successfully.")
        }
        Err(e) => flash::error_redirect("/dashboard", &format!("ERROR: {e}")),
    }
}

pub async fn delete_all(_auth: AuthUser, state: web::Data<AppState>) -> HttpResponse {
    match state.employees.delete_all_employees().await {
        Ok(removed) => {
            info!(removed, "all employees deleted");
            flash::success_redirect(
                "/dashboard",
                "All data from the database deleted successfully",
            )
        }
        Err(e) => flash::error_redirect("/dashboard", &format!("ERROR: {e}")),
    }
}
