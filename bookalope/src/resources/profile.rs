use serde::Serialize;
use serde_json::Value;

use crate::BookalopeClient;
use crate::errors::{Error, Result};
use crate::util::{opt_str, take_field};

const PROFILE_PATH: &str = "/api/profile";

/// The authenticated user's profile.
///
/// Edit the public fields, then [`Profile::save`]; both names are always sent.
#[derive(Debug, Clone)]
pub struct Profile {
    client: BookalopeClient,
    /// First name.
    pub firstname: String,
    /// Last name.
    pub lastname: String,
}

#[derive(Serialize)]
struct ProfileBody<'a> {
    firstname: &'a str,
    lastname: &'a str,
}

impl Profile {
    /// `GET /api/profile`.
    pub async fn fetch(client: &BookalopeClient) -> Result<Profile> {
        let mut profile = Profile {
            client: client.clone(),
            firstname: String::new(),
            lastname: String::new(),
        };
        profile.refresh().await?;
        Ok(profile)
    }

    /// Re-read both names from the server.
    pub async fn refresh(&mut self) -> Result<()> {
        let user = take_field(self.client.get(PROFILE_PATH, &[]).await?.into_json()?, "user")?;
        let Value::Object(user) = user else {
            return Err(Error::malformed("`user` is not a JSON object"));
        };
        self.firstname = opt_str(&user, "firstname").unwrap_or_default();
        self.lastname = opt_str(&user, "lastname").unwrap_or_default();
        Ok(())
    }

    /// `POST /api/profile` with both names.
    pub async fn save(&self) -> Result<()> {
        let body = ProfileBody {
            firstname: &self.firstname,
            lastname: &self.lastname,
        };
        self.client.post(PROFILE_PATH, &body).await?;
        Ok(())
    }
}

impl BookalopeClient {
    /// Fetch the profile of the account this client's token belongs to.
    pub async fn get_profile(&self) -> Result<Profile> {
        Profile::fetch(self).await
    }
}
