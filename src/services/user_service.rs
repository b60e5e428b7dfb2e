//! 账号注册与登录

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::jwt::JwtService;
use crate::errors::{Result, ToolbeltError};
use crate::storage::{NewUser, User, UserStore};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validators::{validate_email, validate_password, validate_username};

pub struct UserService {
    store: Arc<dyn UserStore>,
    jwt: Arc<JwtService>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, jwt: Arc<JwtService>) -> Self {
        Self { store, jwt }
    }

    /// 注册新用户
    ///
    /// 用户名或邮箱已被占用时返回 `Conflict`
    pub async fn register(&self, email: &str, username: &str, password: &str) -> Result<User> {
        let email = email.trim();
        let username = username.trim();

        validate_username(username)?;
        validate_email(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .store
            .insert_user(NewUser {
                email: email.to_string(),
                username: username.to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                ToolbeltError::Conflict(_) => {
                    ToolbeltError::conflict("Username or email is already registered")
                }
                other => other,
            })?;

        info!(
            "UserService: registered user '{}' (id {})",
            user.username, user.id
        );
        Ok(user)
    }

    /// 登录，返回用户与 access token
    ///
    /// 用户不存在与密码错误返回相同的错误
    pub async fn login(&self, login: &str, password: &str) -> Result<(User, String)> {
        let login = login.trim();
        if login.is_empty() || password.is_empty() {
            return Err(ToolbeltError::invalid_input("Login and password are required"));
        }

        let bad_credentials = || ToolbeltError::unauthorized("Invalid login or password");

        let Some(user) = self.store.find_user_by_login(login).await? else {
            warn!("UserService: login failed for unknown user '{}'", login);
            return Err(bad_credentials());
        };

        if !verify_password(password, &user.password_hash)? {
            warn!("UserService: wrong password for '{}'", user.username);
            return Err(bad_credentials());
        }

        let token = self.jwt.generate_access_token(user.id)?;
        info!("UserService: '{}' logged in", user.username);
        Ok((user, token))
    }

    pub async fn get_user(&self, id: i64) -> Result<User> {
        self.store
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| ToolbeltError::not_found(format!("User {} not found", id)))
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }
}
