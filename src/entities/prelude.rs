pub use super::accounts::Entity as Accounts;
pub use super::constituencies::Entity as Constituencies;
pub use super::counties::Entity as Counties;
pub use super::department_categories::Entity as DepartmentCategories;
pub use super::department_contacts::Entity as DepartmentContacts;
pub use super::department_officers::Entity as DepartmentOfficers;
pub use super::department_units::Entity as DepartmentUnits;
pub use super::departments::Entity as Departments;
pub use super::profiles::Entity as Profiles;
pub use super::sub_counties::Entity as SubCounties;
pub use super::wards::Entity as Wards;
