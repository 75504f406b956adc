pub mod limits {

    pub const USERNAME_MIN: usize = 3;

    pub const USERNAME_MAX: usize = 50;

    pub const PASSWORD_MIN: usize = 6;

    pub const PASSWORD_MAX: usize = 100;

    pub const FULL_NAME_MAX: usize = 100;

    pub const DEFAULT_PAGE_SIZE: u64 = 100;

    pub const MAX_PAGE_SIZE: u64 = 1000;

    pub const MAX_SKIP: u64 = i64::MAX.unsigned_abs();
}

pub mod auth {

    pub const SESSION_USER_KEY: &str = "username";

    pub const LOGIN_COOKIE: &str = "logged_in_user";

    pub const TOKEN_TYPE: &str = "bearer";
}
