//! Cloud credits service: coupons and credits

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::client::{PlatformClient, Service};
use crate::error::{ClientError, Result};
use crate::models::{
    Coupon, CouponList, CreditSummary, DisableCoupon, NewCoupon, NewCredit, RedeemCoupon,
    UnappliedCredits,
};

const COUPONS: &str = "/v1/cloudcredits/coupons";
const CREDITS: &str = "/v1/cloudcredits/credit";

impl NewCoupon {
    /// Standard coupon valid from `start` for `valid_for`
    pub fn standard(
        amount: f64,
        creator: impl Into<String>,
        start: DateTime<Utc>,
        valid_for: Duration,
        num_uses: u32,
    ) -> Self {
        Self {
            amount,
            creator: creator.into(),
            start,
            expires: start + valid_for,
            num_uses,
            is_standard: true,
        }
    }
}

impl PlatformClient {
    // ============ Coupons ============

    pub async fn create_coupon(&self, coupon: &NewCoupon) -> Result<Coupon> {
        let created: Coupon = self.post(Service::Global, COUPONS, coupon).await?;
        info!(code = %created.code, amount = created.amount, "created coupon");
        Ok(created)
    }

    pub async fn get_coupons(&self) -> Result<Vec<Coupon>> {
        let list: CouponList = self.get(Service::Global, COUPONS).await?;
        Ok(list.coupons)
    }

    /// Look up one coupon by code
    pub async fn get_coupon(&self, code: &str) -> Result<Coupon> {
        let list: CouponList = self
            .get_with_query(Service::Global, COUPONS, &[("code", code)])
            .await?;
        list.coupons
            .into_iter()
            .find(|c| c.code == code)
            .ok_or_else(|| ClientError::NotFound {
                url: format!("{COUPONS}?code={code}"),
            })
    }

    pub async fn redeem_coupon(&self, code: &str, account: &str) -> Result<()> {
        let body = RedeemCoupon {
            code,
            cloud_account_id: account,
        };
        self.post_unit(Service::Global, &format!("{COUPONS}/redeem"), &body)
            .await?;
        info!(code, account, "redeemed coupon");
        Ok(())
    }

    pub async fn disable_coupon(&self, code: &str) -> Result<()> {
        self.post_unit(
            Service::Global,
            &format!("{COUPONS}/disable"),
            &DisableCoupon { code },
        )
        .await?;
        info!(code, "disabled coupon");
        Ok(())
    }

    // ============ Credits ============

    pub async fn create_credit(&self, credit: &NewCredit) -> Result<()> {
        self.post_unit(Service::Global, CREDITS, credit).await?;
        info!(
            account = %credit.cloud_account_id,
            amount = credit.original_amount,
            "created credit"
        );
        Ok(())
    }

    pub async fn get_credits(&self, account: &str) -> Result<CreditSummary> {
        self.get_with_query(Service::Global, CREDITS, &[("cloudAccountId", account)])
            .await
    }

    pub async fn get_unapplied_credits(&self, account: &str) -> Result<UnappliedCredits> {
        self.get_with_query(
            Service::Global,
            &format!("{CREDITS}/unapplied"),
            &[("cloudAccountId", account)],
        )
        .await
    }
}
