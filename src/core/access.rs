//! Team roster and the capability check for term writes
//!
//! A project without `.taxo/team.yaml` is single-user and every actor may
//! import. Once a roster exists, the acting user must be an active member
//! holding one of the roster's `manage_roles` (or `admin`).

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::Project;

/// Team roles for authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Editor,
    Manager,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Viewer => write!(f, "viewer"),
            Role::Editor => write!(f, "editor"),
            Role::Manager => write!(f, "manager"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// A team member with their roles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Matched against $TAXO_USER or git user.name
    pub username: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl TeamMember {
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|r| self.roles.contains(r))
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

/// Team roster configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRoster {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub members: Vec<TeamMember>,
    /// Roles allowed to create and update terms
    #[serde(default = "default_manage_roles")]
    pub manage_roles: Vec<Role>,
}

fn default_version() -> u32 {
    1
}

fn default_manage_roles() -> Vec<Role> {
    vec![Role::Manager]
}

impl Default for TeamRoster {
    fn default() -> Self {
        Self {
            version: 1,
            members: Vec::new(),
            manage_roles: default_manage_roles(),
        }
    }
}

/// Authorization failures
#[derive(Debug, Error, Diagnostic)]
pub enum AccessError {
    #[error("team roster {path:?} could not be read: {message}")]
    #[diagnostic(code(taxo::access::roster))]
    RosterUnreadable { path: PathBuf, message: String },

    #[error("could not identify the current user")]
    #[diagnostic(
        code(taxo::access::unknown_actor),
        help("set TAXO_USER or git config user.name to a username from .taxo/team.yaml")
    )]
    UnknownActor,

    #[error("'{user}' is not allowed to write taxonomy terms (requires one of: {required})")]
    #[diagnostic(code(taxo::access::forbidden))]
    Forbidden { user: String, required: String },
}

impl TeamRoster {
    /// Load the roster from the project's .taxo/team.yaml, if there is one
    pub fn load(project: &Project) -> Result<Option<Self>, AccessError> {
        Self::load_from_path(&project.taxo_dir().join("team.yaml"))
    }

    /// Load a roster from a specific path
    ///
    /// A missing file is `Ok(None)`. A file that exists but cannot be parsed
    /// is an error, so a broken roster never opens up access.
    pub fn load_from_path(path: &Path) -> Result<Option<Self>, AccessError> {
        if !path.exists() {
            return Ok(None);
        }
        let unreadable = |message: String| AccessError::RosterUnreadable {
            path: path.to_path_buf(),
            message,
        };
        let contents = std::fs::read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
        let roster = serde_yml::from_str(&contents).map_err(|e| unreadable(e.to_string()))?;
        Ok(Some(roster))
    }

    /// Find an active member by username or email
    pub fn find_member(&self, identity: &str) -> Option<&TeamMember> {
        self.members.iter().find(|m| {
            m.active
                && (m.username.eq_ignore_ascii_case(identity)
                    || (!m.email.is_empty() && m.email.eq_ignore_ascii_case(identity)))
        })
    }

    /// First member matching any of the given identities
    pub fn member_for<'a>(
        &self,
        identities: impl IntoIterator<Item = &'a str>,
    ) -> Option<&TeamMember> {
        identities
            .into_iter()
            .find_map(|identity| self.find_member(identity))
    }

    /// Check if a member can create and update terms
    pub fn can_manage_terms(&self, member: &TeamMember) -> bool {
        member.is_admin() || member.has_any_role(&self.manage_roles)
    }

    /// Authorize the first matching identity for term writes
    pub fn authorize<'a>(
        &self,
        identities: impl IntoIterator<Item = &'a str>,
    ) -> Result<&TeamMember, AccessError> {
        let member = self.member_for(identities).ok_or(AccessError::UnknownActor)?;
        if self.can_manage_terms(member) {
            return Ok(member);
        }

        let mut required: Vec<String> = self.manage_roles.iter().map(Role::to_string).collect();
        if !self.manage_roles.contains(&Role::Admin) {
            required.push(Role::Admin.to_string());
        }
        Err(AccessError::Forbidden {
            user: member.username.clone(),
            required: required.join(", "),
        })
    }
}

/// Identities of the acting user, most specific first
///
/// `$TAXO_USER` wins; otherwise git `user.name` and `user.email`.
pub fn current_identities() -> Vec<String> {
    if let Ok(user) = std::env::var("TAXO_USER") {
        if !user.trim().is_empty() {
            return vec![user.trim().to_string()];
        }
    }

    ["user.name", "user.email"]
        .iter()
        .filter_map(|key| {
            let output = std::process::Command::new("git")
                .args(["config", key])
                .output()
                .ok()?;
            if !output.status.success() {
                return None;
            }
            let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
            (!value.is_empty()).then_some(value)
        })
        .collect()
}

/// Check that the current user may write terms in this project
pub fn authorize_term_writes(project: &Project) -> Result<Option<String>, AccessError> {
    let Some(roster) = TeamRoster::load(project)? else {
        return Ok(None);
    };
    let identities = current_identities();
    let member = roster.authorize(identities.iter().map(String::as_str))?;
    Ok(Some(member.username.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn member(username: &str, roles: Vec<Role>) -> TeamMember {
        TeamMember {
            name: username.to_string(),
            email: format!("{}@example.com", username),
            username: username.to_string(),
            roles,
            active: true,
        }
    }

    fn create_test_roster() -> TeamRoster {
        let mut roster = TeamRoster::default();
        roster.members.push(member("ayse", vec![Role::Manager]));
        roster.members.push(member("mehmet", vec![Role::Editor]));
        roster.members.push(member("root", vec![Role::Admin]));
        let mut former = member("former", vec![Role::Manager]);
        former.active = false;
        roster.members.push(former);
        roster
    }

    #[test]
    fn test_find_member_by_username_or_email() {
        let roster = create_test_roster();
        assert_eq!(roster.find_member("AYSE").unwrap().username, "ayse");
        assert_eq!(roster.find_member("mehmet@example.com").unwrap().username, "mehmet");
        assert!(roster.find_member("former").is_none());
    }

    #[test]
    fn test_manager_and_admin_may_write() {
        let roster = create_test_roster();
        assert!(roster.authorize(["ayse"]).is_ok());
        assert!(roster.authorize(["root"]).is_ok());
    }

    #[test]
    fn test_editor_is_forbidden_by_default() {
        let roster = create_test_roster();
        let err = roster.authorize(["mehmet"]).unwrap_err();
        match err {
            AccessError::Forbidden { user, required } => {
                assert_eq!(user, "mehmet");
                assert_eq!(required, "manager, admin");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_manage_roles_are_configurable() {
        let mut roster = create_test_roster();
        roster.manage_roles = vec![Role::Editor];
        assert!(roster.authorize(["mehmet"]).is_ok());
        assert!(roster.authorize(["ayse"]).is_err());
    }

    #[test]
    fn test_unknown_actor() {
        let roster = create_test_roster();
        assert!(matches!(
            roster.authorize(["stranger", "stranger@example.com"]),
            Err(AccessError::UnknownActor)
        ));
        assert!(matches!(
            roster.authorize(std::iter::empty()),
            Err(AccessError::UnknownActor)
        ));
    }

    #[test]
    fn test_second_identity_matches() {
        let roster = create_test_roster();
        let member = roster.authorize(["Ayşe Yılmaz", "ayse@example.com"]).unwrap();
        assert_eq!(member.username, "ayse");
    }

    #[test]
    fn test_load_roundtrip() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("team.yaml");

        let yaml = serde_yml::to_string(&create_test_roster()).unwrap();
        std::fs::write(&path, yaml).unwrap();
        let loaded = TeamRoster::load_from_path(&path).unwrap().unwrap();
        assert_eq!(loaded.members.len(), 4);
        assert_eq!(loaded.manage_roles, vec![Role::Manager]);
    }

    #[test]
    fn test_missing_roster_is_none() {
        let tmp = tempdir().unwrap();
        assert!(TeamRoster::load_from_path(&tmp.path().join("team.yaml"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_malformed_roster_is_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("team.yaml");
        std::fs::write(&path, "members: {not: a list}\n").unwrap();
        assert!(matches!(
            TeamRoster::load_from_path(&path),
            Err(AccessError::RosterUnreadable { .. })
        ));
    }

    #[test]
    fn test_roster_defaults_from_yaml() {
        let roster: TeamRoster =
            serde_yml::from_str("members:\n  - name: Ayşe\n    username: ayse\n    roles: [manager]\n")
                .unwrap();
        assert_eq!(roster.version, 1);
        assert!(roster.members[0].active);
        assert!(roster.authorize(["ayse"]).is_ok());
    }
}
