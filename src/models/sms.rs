/*
External model defined by Twilio's Messages resource.
*/

#[derive(serde::Deserialize, Debug)]
pub struct TwilioMessage {
    pub sid: String,
}
