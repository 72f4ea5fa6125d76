//! Data models for the RBAC system

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{RbacError, RbacResult};

/// Version of the closed scope set. Bump whenever a token is added or removed.
pub const SCOPE_SET_VERSION: u32 = 1;

/// Permission token granted to an actor
///
/// The set is closed: a token that does not parse into one of these variants
/// is never granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Scope {
    #[serde(rename = "school:read")]
    SchoolRead,
    #[serde(rename = "school:write")]
    SchoolWrite,
    #[serde(rename = "school:admin")]
    SchoolAdmin,
    #[serde(rename = "library:read")]
    LibraryRead,
    #[serde(rename = "library:write")]
    LibraryWrite,
    #[serde(rename = "attendance:read")]
    AttendanceRead,
    #[serde(rename = "attendance:write")]
    AttendanceWrite,
    #[serde(rename = "lms:read")]
    LmsRead,
    #[serde(rename = "lms:write")]
    LmsWrite,
    #[serde(rename = "finance:read")]
    FinanceRead,
    #[serde(rename = "finance:write")]
    FinanceWrite,
    #[serde(rename = "cms:read")]
    CmsRead,
    #[serde(rename = "cms:write")]
    CmsWrite,
}

impl Scope {
    /// Every token in the current scope set
    pub const ALL: [Scope; 13] = [
        Scope::SchoolRead,
        Scope::SchoolWrite,
        Scope::SchoolAdmin,
        Scope::LibraryRead,
        Scope::LibraryWrite,
        Scope::AttendanceRead,
        Scope::AttendanceWrite,
        Scope::LmsRead,
        Scope::LmsWrite,
        Scope::FinanceRead,
        Scope::FinanceWrite,
        Scope::CmsRead,
        Scope::CmsWrite,
    ];

    /// Wire token for this scope
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::SchoolRead => "school:read",
            Scope::SchoolWrite => "school:write",
            Scope::SchoolAdmin => "school:admin",
            Scope::LibraryRead => "library:read",
            Scope::LibraryWrite => "library:write",
            Scope::AttendanceRead => "attendance:read",
            Scope::AttendanceWrite => "attendance:write",
            Scope::LmsRead => "lms:read",
            Scope::LmsWrite => "lms:write",
            Scope::FinanceRead => "finance:read",
            Scope::FinanceWrite => "finance:write",
            Scope::CmsRead => "cms:read",
            Scope::CmsWrite => "cms:write",
        }
    }

    /// App area the scope belongs to
    pub fn domain(&self) -> ScopeDomain {
        match self {
            Scope::SchoolRead | Scope::SchoolWrite | Scope::SchoolAdmin => ScopeDomain::School,
            Scope::LibraryRead | Scope::LibraryWrite => ScopeDomain::Library,
            Scope::AttendanceRead | Scope::AttendanceWrite => ScopeDomain::Attendance,
            Scope::LmsRead | Scope::LmsWrite => ScopeDomain::Lms,
            Scope::FinanceRead | Scope::FinanceWrite => ScopeDomain::Finance,
            Scope::CmsRead | Scope::CmsWrite => ScopeDomain::Cms,
        }
    }

    /// Access level the scope grants within its domain
    pub fn access(&self) -> Access {
        match self {
            Scope::SchoolAdmin => Access::Admin,
            Scope::SchoolWrite
            | Scope::LibraryWrite
            | Scope::AttendanceWrite
            | Scope::LmsWrite
            | Scope::FinanceWrite
            | Scope::CmsWrite => Access::Write,
            _ => Access::Read,
        }
    }

    /// Look up the scope for a domain and access level, if the set has one
    pub fn from_parts(domain: ScopeDomain, access: Access) -> Option<Scope> {
        Scope::ALL
            .into_iter()
            .find(|scope| scope.domain() == domain && scope.access() == access)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = RbacError;

    fn from_str(s: &str) -> RbacResult<Self> {
        // Exact match only, same as the serde names
        Scope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| RbacError::unknown_scope(s))
    }
}

/// App area a scope token is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeDomain {
    School,
    Library,
    Attendance,
    Lms,
    Finance,
    Cms,
}

/// Access level carried by a scope token
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Read,
    Write,
    Admin,
}

/// Fixed set of roles an actor can hold
///
/// The role is informational. Live authorization uses the actor's scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    SchoolAdmin,
    LmsAdmin,
    Bursar,
    Teacher,
    Librarian,
    FrontDesk,
    Student,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::SuperAdmin,
        Role::SchoolAdmin,
        Role::LmsAdmin,
        Role::Bursar,
        Role::Teacher,
        Role::Librarian,
        Role::FrontDesk,
        Role::Student,
    ];

    /// Convert to string for use in reports and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::SchoolAdmin => "school_admin",
            Role::LmsAdmin => "lms_admin",
            Role::Bursar => "bursar",
            Role::Teacher => "teacher",
            Role::Librarian => "librarian",
            Role::FrontDesk => "front_desk",
            Role::Student => "student",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Administrator",
            Role::SchoolAdmin => "School Administrator",
            Role::LmsAdmin => "LMS Administrator",
            Role::Bursar => "Bursar",
            Role::Teacher => "Teacher",
            Role::Librarian => "Librarian",
            Role::FrontDesk => "Front Desk",
            Role::Student => "Student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RbacError;

    fn from_str(s: &str) -> RbacResult<Self> {
        let name = s.trim().to_lowercase().replace('-', "_");
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == name)
            .ok_or_else(|| RbacError::unknown_role(s))
    }
}

/// Resource types reported by the scope registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Schools,
    Students,
    Staff,
    Classes,
    Attendance,
    Library,
    Courses,
    Fees,
    Content,
    Reports,
    Settings,
}

impl ResourceType {
    /// Convert to string for use in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Schools => "schools",
            ResourceType::Students => "students",
            ResourceType::Staff => "staff",
            ResourceType::Classes => "classes",
            ResourceType::Attendance => "attendance",
            ResourceType::Library => "library",
            ResourceType::Courses => "courses",
            ResourceType::Fees => "fees",
            ResourceType::Content => "content",
            ResourceType::Reports => "reports",
            ResourceType::Settings => "settings",
        }
    }

    /// Scope domain that guards this resource in the live check
    pub fn scope_domain(&self) -> ScopeDomain {
        match self {
            ResourceType::Attendance => ScopeDomain::Attendance,
            ResourceType::Library => ScopeDomain::Library,
            ResourceType::Courses => ScopeDomain::Lms,
            ResourceType::Fees => ScopeDomain::Finance,
            ResourceType::Content => ScopeDomain::Cms,
            ResourceType::Schools
            | ResourceType::Students
            | ResourceType::Staff
            | ResourceType::Classes
            | ResourceType::Reports
            | ResourceType::Settings => ScopeDomain::School,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action types listed in registry entries, ordered by declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Create,
    Read,
    Update,
    Delete,
    Export,
    Approve,
}

impl ActionType {
    /// Convert to string for use in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Create => "create",
            ActionType::Read => "read",
            ActionType::Update => "update",
            ActionType::Delete => "delete",
            ActionType::Export => "export",
            ActionType::Approve => "approve",
        }
    }

    /// Access level a scope must carry to cover this action
    pub fn required_access(&self) -> Access {
        match self {
            ActionType::Read | ActionType::Export => Access::Read,
            ActionType::Create | ActionType::Update | ActionType::Delete | ActionType::Approve => {
                Access::Write
            }
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_tokens_parse() {
        for scope in Scope::ALL {
            assert_eq!(scope.as_str().parse::<Scope>().unwrap(), scope);
        }

        assert!("school:fly".parse::<Scope>().is_err());
        assert!("School:Read".parse::<Scope>().is_err());
        assert!("".parse::<Scope>().is_err());
        assert!("school:admin ".parse::<Scope>().is_err());
        assert!(" lms:read".parse::<Scope>().is_err());
    }

    #[test]
    fn test_scope_serde_uses_wire_tokens() {
        let json = serde_json::to_string(&Scope::AttendanceWrite).unwrap();
        assert_eq!(json, "\"attendance:write\"");

        let scope: Scope = serde_json::from_str("\"library:read\"").unwrap();
        assert_eq!(scope, Scope::LibraryRead);

        assert!(serde_json::from_str::<Scope>("\"library:burn\"").is_err());
    }

    #[test]
    fn test_scope_parts() {
        assert_eq!(Scope::SchoolAdmin.access(), Access::Admin);
        assert_eq!(Scope::LmsWrite.domain(), ScopeDomain::Lms);
        assert_eq!(
            Scope::from_parts(ScopeDomain::Finance, Access::Write),
            Some(Scope::FinanceWrite)
        );
        assert_eq!(Scope::from_parts(ScopeDomain::Library, Access::Admin), None);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("teacher".parse::<Role>().unwrap(), Role::Teacher);
        assert_eq!("front-desk".parse::<Role>().unwrap(), Role::FrontDesk);
        assert_eq!("SUPER_ADMIN".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert!("janitor".parse::<Role>().is_err());
    }

    #[test]
    fn test_action_ordering() {
        let mut actions = vec![ActionType::Delete, ActionType::Create, ActionType::Read];
        actions.sort();
        assert_eq!(
            actions,
            vec![ActionType::Create, ActionType::Read, ActionType::Delete]
        );
    }

    #[test]
    fn test_resource_domains() {
        assert_eq!(ResourceType::Courses.scope_domain(), ScopeDomain::Lms);
        assert_eq!(ResourceType::Fees.scope_domain(), ScopeDomain::Finance);
        assert_eq!(ResourceType::Students.scope_domain(), ScopeDomain::School);
    }
}
