use crate::message::{Point, User, UserId};

const MAX_NAME_CHARS: usize = 32;

pub const DEFAULT_PALETTE: [&str; 12] = [
    "#F87171", "#FB923C", "#FACC15", "#4ADE80", "#2DD4BF", "#38BDF8", "#818CF8", "#C084FC",
    "#F472B6", "#A3E635", "#E879F9", "#94A3B8",
];

pub fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

/// Connected users in admission order.
pub struct PresenceRegistry {
    users: Vec<User>,
    palette: Vec<String>,
    admissions: usize,
    cursors_dirty: bool,
}

impl PresenceRegistry {
    pub fn new(palette: Vec<String>) -> Self {
        let palette = if palette.is_empty() {
            default_palette()
        } else {
            palette
        };
        Self {
            users: Vec::new(),
            palette,
            admissions: 0,
            cursors_dirty: false,
        }
    }

    pub fn admit(&mut self, name: Option<&str>) -> User {
        self.admissions += 1;
        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.chars().take(MAX_NAME_CHARS).collect(),
            None => format!("User {}", self.admissions),
        };
        let user = User {
            id: uuid::Uuid::new_v4(),
            name,
            color: self.next_color(),
            cursor: None,
        };
        log::info!("User {} ({}) admitted as {}", user.id, user.name, user.color);
        self.users.push(user.clone());
        user
    }

    /// First palette color nobody connected holds; cycles once the palette is exhausted.
    fn next_color(&self) -> String {
        self.palette
            .iter()
            .find(|color| self.users.iter().all(|u| &u.color != *color))
            .cloned()
            .unwrap_or_else(|| self.palette[(self.admissions - 1) % self.palette.len()].clone())
    }

    /// Returns false when the user already left.
    pub fn update_cursor(&mut self, user_id: &UserId, point: Point) -> bool {
        if let Some(user) = self.users.iter_mut().find(|u| &u.id == user_id) {
            user.cursor = Some(point);
            self.cursors_dirty = true;
            true
        } else {
            false
        }
    }

    pub fn remove(&mut self, user_id: &UserId) -> Option<User> {
        let pos = self.users.iter().position(|u| &u.id == user_id)?;
        let user = self.users.remove(pos);
        log::info!("User {} ({}) removed", user.id, user.name);
        Some(user)
    }

    pub fn get(&self, user_id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == user_id)
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.get(user_id).is_some()
    }

    pub fn roster(&self) -> &[User] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Reports whether any cursor moved since the last call and clears the flag.
    pub fn take_dirty_cursors(&mut self) -> bool {
        std::mem::replace(&mut self.cursors_dirty, false)
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new(default_palette())
    }
}
