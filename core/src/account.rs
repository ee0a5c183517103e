//! Account-level operations of the CreateSend API.
//!
//! Each method is a thin pass-through: one dispatcher call, then typed
//! decoding of the payload.

use crate::auth::Credentials;
use crate::config::Context;
use crate::dispatcher::{Dispatcher, RequestSpec};
use crate::error::Result;
use crate::fixture::Fixture;
use crate::response::decode_json;
use crate::types::{
    Administrator, ApiKeyResponse, BillingDetails, ClientSummary, PrimaryContact, SystemDate,
};

/// Account-wide functionality: API key lookup, clients, billing, reference
/// data, administrators and the primary contact.
#[derive(Debug, Default)]
pub struct CreateSend {
    dispatcher: Dispatcher,
}

impl CreateSend {
    pub fn new(context: Context) -> Self {
        Self {
            dispatcher: Dispatcher::new(context),
        }
    }

    pub fn with_credentials(context: Context, credentials: Credentials) -> Self {
        let mut account = Self::new(context);
        account.dispatcher.set_credentials(credentials);
        account
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.dispatcher.set_credentials(credentials);
    }

    pub fn install_fixture(&mut self, fixture: Fixture) {
        self.dispatcher.install_fixture(fixture);
    }

    /// Looks up the API key for a site, authenticating with the account
    /// login instead of any configured credentials.
    pub fn apikey(&mut self, site_url: &str, username: &str, password: &str) -> Result<String> {
        let payload = self.dispatcher.execute(
            RequestSpec::get("/apikey.json")
                .query("SiteUrl", site_url)
                .basic_override(username, password),
        )?;
        let response: ApiKeyResponse = decode_json(&payload)?;
        Ok(response.api_key)
    }

    pub fn clients(&mut self) -> Result<Vec<ClientSummary>> {
        let payload = self.dispatcher.get("/clients.json", &[])?;
        decode_json(&payload)
    }

    pub fn billing_details(&mut self) -> Result<BillingDetails> {
        let payload = self.dispatcher.get("/billingdetails.json", &[])?;
        decode_json(&payload)
    }

    /// Country names accepted by the API.
    pub fn countries(&mut self) -> Result<Vec<String>> {
        let payload = self.dispatcher.get("/countries.json", &[])?;
        decode_json(&payload)
    }

    /// Current date in the account's timezone.
    pub fn system_date(&mut self) -> Result<String> {
        let payload = self.dispatcher.get("/systemdate.json", &[])?;
        let date: SystemDate = decode_json(&payload)?;
        Ok(date.system_date)
    }

    /// Timezone labels accepted by the API.
    pub fn timezones(&mut self) -> Result<Vec<String>> {
        let payload = self.dispatcher.get("/timezones.json", &[])?;
        decode_json(&payload)
    }

    pub fn administrators(&mut self) -> Result<Vec<Administrator>> {
        let payload = self.dispatcher.get("/admins.json", &[])?;
        decode_json(&payload)
    }

    pub fn primary_contact(&mut self) -> Result<PrimaryContact> {
        let payload = self.dispatcher.get("/primarycontact.json", &[])?;
        decode_json(&payload)
    }

    /// Makes the administrator with `email` the account's primary contact.
    pub fn set_primary_contact(&mut self, email: &str) -> Result<PrimaryContact> {
        let payload = self
            .dispatcher
            .put("/primarycontact.json", "", &[("email", email)])?;
        decode_json(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::error::Error;

    const BASE: &str = "http://api.example.com/api/v3";

    fn account() -> CreateSend {
        CreateSend::with_credentials(
            Context::new(ClientConfig::new(BASE)),
            Credentials::api_key("abc"),
        )
    }

    #[test]
    fn apikey_uses_login_and_site_url() {
        let mut cs = account();
        cs.install_fixture(Fixture::inline(
            "http://api.example.com/api/v3/apikey.json?SiteUrl=ex.com",
            r#"{"ApiKey":"981298u298ue98u219e8u2e98u2"}"#,
        ));
        let key = cs.apikey("ex.com", "u", "p").unwrap();
        assert_eq!(key, "981298u298ue98u219e8u2e98u2");
        assert_eq!(
            cs.dispatcher().last_request().unwrap().header("Authorization"),
            Some("Basic dTpw")
        );
    }

    #[test]
    fn clients_decodes_summaries() {
        let mut cs = account();
        cs.install_fixture(Fixture::inline(
            "http://api.example.com/api/v3/clients.json",
            r#"[{"ClientID":"4a397ccaaa55eb4e6aa1221e1e2d7122","Name":"Client One"},{"ClientID":"a206def0582eec7dae47d937a4109cb2","Name":"Client Two"}]"#,
        ));
        let clients = cs.clients().unwrap();
        assert_eq!(clients.len(), 2);
        assert_eq!(clients[1].name, "Client Two");
    }

    #[test]
    fn system_date_unwraps_field() {
        let mut cs = account();
        cs.install_fixture(Fixture::inline(
            "http://api.example.com/api/v3/systemdate.json",
            r#"{"SystemDate":"2010-10-15 09:27:00"}"#,
        ));
        assert_eq!(cs.system_date().unwrap(), "2010-10-15 09:27:00");
    }

    #[test]
    fn set_primary_contact_puts_email_in_query() {
        let mut cs = account();
        cs.install_fixture(Fixture::inline(
            "http://api.example.com/api/v3/primarycontact.json?email=admin%40blackhole.com",
            r#"{"EmailAddress":"admin@blackhole.com"}"#,
        ));
        let contact = cs.set_primary_contact("admin@blackhole.com").unwrap();
        assert_eq!(contact.email_address, "admin@blackhole.com");
    }

    #[test]
    fn unexpected_payload_is_a_deserialization_error() {
        let mut cs = account();
        cs.install_fixture(Fixture::inline(
            "http://api.example.com/api/v3/billingdetails.json",
            r#"{"Credits":"lots"}"#,
        ));
        assert!(matches!(cs.billing_details(), Err(Error::Deserialization(_))));
    }

    #[test]
    fn classified_errors_pass_through() {
        let mut cs = account();
        cs.install_fixture(
            Fixture::inline(
                "http://api.example.com/api/v3/apikey.json?SiteUrl=ex.com",
                r#"{"Code": 50, "Message": "Must supply a valid HTTP Basic Authorization header"}"#,
            )
            .with_status(401),
        );
        let err = cs.apikey("ex.com", "u", "wrong").unwrap_err();
        assert!(matches!(err, Error::Unauthorized(ref b) if b.code == 50));
    }
}
