/// CSS selectors for the payment hand-off page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSelectors {
    pub proceed_button: String,
    pub terms_checkbox: String,
    pub agree_button: String,
    pub out_of_stock_msg: String,
}

pub const OUT_OF_STOCK_TEXT: &str = "out of stock";

impl Default for CheckoutSelectors {
    fn default() -> Self {
        Self {
            proceed_button: "button.a-button.m-cartActionBar__button.-regular.-transaction.-filled.-withShapes.-shapecorner.-shapePadding24.-leftPadding24[data-cy-id='__place-order-button']".to_string(),
            terms_checkbox: "div.a-checkboxDisplay.a-checkbox__wrapper.-interactive[data-cy-id='checkbox__display']".to_string(),
            agree_button: "button.a-button.m-modalFooter__primaryButton.-regular.-interaction.-filled.-withShapes.-shapecorner.-shapePadding24.-leftPadding24[data-cy-id='modal_footer__primary_button']".to_string(),
            out_of_stock_msg: "p.m-toast__title.a-fontStyle.-emphasis-3.-no-rich-text[data-cy-id='toast__title']".to_string(),
        }
    }
}

impl CheckoutSelectors {
    /// Elements that must all be on the page before the flow starts, by display name.
    pub fn required(&self) -> [(&'static str, &str); 3] {
        [
            ("terms_checkbox", self.terms_checkbox.as_str()),
            ("agree_button", self.agree_button.as_str()),
            ("proceed_button", self.proceed_button.as_str()),
        ]
    }
}
