use crate::{
    auth::{
        models::{LoginPayload, RegisterPayload, Role, TokenResponse},
        session::Session,
    },
    error::Result,
    services::api_client::ApiClient,
};

pub struct AuthService;

impl AuthService {
    /// Signs in and stores the returned token and role in the client's session.
    pub async fn login(client: &ApiClient, payload: &LoginPayload) -> Result<Role> {
        payload.validate()?;

        let response: TokenResponse = client.post(&client.config().login_path, payload).await?;
        Self::start_session(client, response)
    }

    pub async fn register(client: &ApiClient, payload: &RegisterPayload) -> Result<Role> {
        payload.validate()?;

        let response: TokenResponse = client
            .post(&client.config().register_path, payload)
            .await?;
        Self::start_session(client, response)
    }

    /// Forgets the local session. The backend is not contacted.
    pub fn logout(client: &ApiClient) -> Result<()> {
        client.session().clear()?;
        tracing::info!("Logged out");
        Ok(())
    }

    fn start_session(client: &ApiClient, response: TokenResponse) -> Result<Role> {
        let role = response.role;
        client.session().set(Session::new(response.token, role))?;

        tracing::info!("Logged in as {}", role);
        Ok(role)
    }
}
