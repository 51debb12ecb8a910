//! Repo manifest entity
//!
//! Declares which profiles a source provides. Declaration order is kept: it
//! decides the expansion order of `profile:*` selectors.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubProfileDecl {
    pub id: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDecl {
    pub id: String,
    pub description: String,
    pub sub_profiles: Vec<SubProfileDecl>,
}

impl ProfileDecl {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            sub_profiles: Vec::new(),
        }
    }

    pub fn with_sub_profile(mut self, id: impl Into<String>, description: impl Into<String>) -> Self {
        self.sub_profiles.push(SubProfileDecl {
            id: id.into(),
            description: description.into(),
        });
        self
    }

    pub fn sub_profile(&self, id: &str) -> Option<&SubProfileDecl> {
        self.sub_profiles.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepoManifest {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub profiles: Vec<ProfileDecl>,
}

impl RepoManifest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_profile(mut self, profile: ProfileDecl) -> Self {
        self.profiles.push(profile);
        self
    }

    pub fn profile(&self, id: &str) -> Option<&ProfileDecl> {
        self.profiles.iter().find(|p| p.id == id)
    }
}
