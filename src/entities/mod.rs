pub mod prelude;

pub mod accounts;
pub mod constituencies;
pub mod counties;
pub mod department_categories;
pub mod department_contacts;
pub mod department_officers;
pub mod department_units;
pub mod departments;
pub mod profiles;
pub mod sub_counties;
pub mod wards;
