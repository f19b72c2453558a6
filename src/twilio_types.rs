pub fn wrap_twiml(twiml: String) -> String {
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>{twiml}")
}

mod twiml {
    use xmlserde_derives::XmlSerialize;

    #[derive(PartialEq, Eq, XmlSerialize)]
    #[xmlserde(root = b"Response")]
    pub struct Response {
        #[xmlserde(ty = "untag")]
        pub actions: Vec<ResponseAction>,
    }

    #[derive(PartialEq, Eq, XmlSerialize)]
    pub enum ResponseAction {
        #[xmlserde(name = b"Message")]
        Message(MessageAction),
    }

    #[derive(PartialEq, Eq, XmlSerialize, Default)]
    pub struct MessageAction {
        #[xmlserde(ty = "text")]
        pub body: String,
        #[xmlserde(name = b"to", ty = "attr")]
        pub to: Option<String>,
        #[xmlserde(name = b"from", ty = "attr")]
        pub from: Option<String>,
    }
}
pub use twiml::*;

/// Render one outbound reply in Twilio's messaging markup.
pub fn message_response(text: &str) -> String {
    let message = MessageAction {
        body: text.to_string(),
        ..Default::default()
    };
    let response = Response {
        actions: vec![ResponseAction::Message(message)],
    };
    wrap_twiml(xmlserde::xml_serialize(response))
}

mod webhook {
    use serde::Deserialize;

    /// Form payload Twilio posts for one inbound WhatsApp message.  Twilio
    /// sends many more fields; only the ones the bot reads are declared.
    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "PascalCase")]
    pub struct TwilioMessagePayload {
        pub from: String,
        pub body: String,
        #[serde(default)]
        pub to: Option<String>,
        #[serde(default)]
        pub message_sid: Option<String>,
    }
}
pub use webhook::*;
