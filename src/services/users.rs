//! Lazy user registration

use std::sync::Arc;
use tracing::info;

use crate::errors::ShoppingResult;
use crate::ids::UserId;
use crate::model::User;
use crate::repository::UserRepository;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Look the user up by Telegram identity, creating it on first contact.
    ///
    /// The boolean is `true` when the user was created by this call.
    pub async fn get_or_create_user(
        &self,
        telegram_id: &UserId,
        username: Option<&str>,
    ) -> ShoppingResult<(User, bool)> {
        if let Some(mut user) = self.users.find_by_telegram_id(telegram_id).await? {
            if username.is_some() && user.username() != username {
                user.set_username(username.map(str::to_string));
                self.users.save(&user).await?;
            }
            return Ok((user, false));
        }

        let user = User::create(telegram_id.clone(), username.map(str::to_string));
        self.users.save(&user).await?;
        info!(user_id = %telegram_id, "Registered new user");
        Ok((user, true))
    }

    pub async fn get_user_by_telegram_id(
        &self,
        telegram_id: &UserId,
    ) -> ShoppingResult<Option<User>> {
        self.users.find_by_telegram_id(telegram_id).await
    }

    pub async fn update_user(&self, user: &User) -> ShoppingResult<()> {
        self.users.save(user).await
    }
}
