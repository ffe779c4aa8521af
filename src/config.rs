#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_token_maxage: i64,
    pub refresh_token_maxage: i64,
    pub port: u16,
    pub client_url: String,
    pub admin_url: String,
    pub production: bool,
}

impl Config {

    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let access_token_secret =
            std::env::var("ACCESS_TOKEN_SECRET").expect("ACCESS_TOKEN_SECRET must be set");
        let refresh_token_secret =
            std::env::var("REFRESH_TOKEN_SECRET").expect("REFRESH_TOKEN_SECRET must be set");
        let client_url = std::env::var("CLIENT_URL").expect("CLIENT_URL must be set");
        let admin_url = std::env::var("ADMIN_URL").expect("ADMIN_URL must be set");

        // Access token 15 minutes, refresh token 7 days unless overridden.
        let access_token_maxage = std::env::var("ACCESS_TOKEN_MAXAGE")
            .unwrap_or_else(|_| "900".to_string())
            .parse::<i64>()
            .expect("ACCESS_TOKEN_MAXAGE must be an integer number of seconds");
        let refresh_token_maxage = std::env::var("REFRESH_TOKEN_MAXAGE")
            .unwrap_or_else(|_| "604800".to_string())
            .parse::<i64>()
            .expect("REFRESH_TOKEN_MAXAGE must be an integer number of seconds");

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid port number");

        let production = std::env::var("ENVIRONMENT")
            .map(|env| env == "production")
            .unwrap_or(false);

        Config {
            database_url,
            access_token_secret,
            refresh_token_secret,
            access_token_maxage,
            refresh_token_maxage,
            port,
            client_url,
            admin_url,
            production,
        }
    }

}
