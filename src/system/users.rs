use std::collections::HashMap;

use sysinfo::{Uid, Users};

/// Maps a numeric owner id to a display name.
pub trait UserResolver {
    fn user_name(&mut self, uid: u32) -> Option<String>;

    /// Called once at the start of every refresh cycle.
    fn begin_cycle(&mut self) {}

    /// Display name for `uid`, falling back to the decimal id.
    fn display_name(&mut self, uid: u32) -> String {
        self.user_name(uid).unwrap_or_else(|| uid.to_string())
    }
}

/// Resolver backed by the system account database.
///
/// Lookups are memoized; the account list is reloaded once per refresh cycle
/// at most, and only when an unknown uid shows up.
pub struct SystemUsers {
    users: Users,
    cache: HashMap<u32, Option<String>>,
    reloaded: bool,
}

impl Default for SystemUsers {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemUsers {
    pub fn new() -> Self {
        Self {
            users: Users::new_with_refreshed_list(),
            cache: HashMap::new(),
            reloaded: true,
        }
    }

    fn lookup(&self, uid: u32) -> Option<String> {
        let uid = Uid::try_from(uid as usize).ok()?;
        self.users
            .get_user_by_id(&uid)
            .map(|user| user.name().to_string())
    }
}

impl UserResolver for SystemUsers {
    // Allow one account reload per cycle.
    fn begin_cycle(&mut self) {
        self.reloaded = false;
    }

    fn user_name(&mut self, uid: u32) -> Option<String> {
        if let Some(Some(name)) = self.cache.get(&uid) {
            return Some(name.clone());
        }
        if self.cache.contains_key(&uid) && self.reloaded {
            return None;
        }

        let mut name = self.lookup(uid);
        if name.is_none() && !self.reloaded {
            self.users.refresh();
            self.reloaded = true;
            name = self.lookup(uid);
        }
        self.cache.insert(uid, name.clone());
        name
    }
}

/// Fixed table resolver, handy where the host account database must not leak
/// into results.
#[derive(Debug, Default, Clone)]
pub struct StaticUsers(pub HashMap<u32, String>);

impl StaticUsers {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        Self(entries.into_iter().map(|(uid, n)| (uid, n.into())).collect())
    }
}

impl UserResolver for StaticUsers {
    fn user_name(&mut self, uid: u32) -> Option<String> {
        self.0.get(&uid).cloned()
    }
}
